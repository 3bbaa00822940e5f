use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_products_table::Migration),
            Box::new(m20250601_000002_create_orders_table::Migration),
            Box::new(m20250601_000003_create_coupons_table::Migration),
            Box::new(m20250601_000004_create_blog_posts_table::Migration),
            Box::new(m20250601_000005_create_reviews_table::Migration),
            Box::new(m20250601_000006_create_store_settings_table::Migration),
            Box::new(m20250601_000007_create_cms_content_table::Migration),
        ]
    }
}

mod m20250601_000001_create_products_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Title).string().not_null())
                        .col(
                            ColumnDef::new(Products::Handle)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::OriginalPrice)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(Products::Image).string().not_null())
                        .col(ColumnDef::new(Products::Images).json().not_null())
                        .col(ColumnDef::new(Products::Tag).string().null())
                        .col(ColumnDef::new(Products::Category).string().null())
                        .col(ColumnDef::new(Products::Description).text().null())
                        .col(ColumnDef::new(Products::Sizes).json().not_null())
                        .col(ColumnDef::new(Products::Colors).json().not_null())
                        .col(ColumnDef::new(Products::Details).json().not_null())
                        .col(ColumnDef::new(Products::Rating).double().null())
                        .col(ColumnDef::new(Products::ReviewCount).integer().null())
                        .col(
                            ColumnDef::new(Products::InStock)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Products::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_category")
                        .table(Products::Table)
                        .col(Products::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Products {
        Table,
        Id,
        Title,
        Handle,
        Price,
        OriginalPrice,
        Image,
        Images,
        Tag,
        Category,
        Description,
        Sizes,
        Colors,
        Details,
        Rating,
        ReviewCount,
        InStock,
        SortOrder,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250601_000002_create_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000002_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::UserId).uuid().not_null())
                        .col(
                            ColumnDef::new(Orders::RazorpayOrderId)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::RazorpayPaymentId).string().null())
                        .col(ColumnDef::new(Orders::Amount).decimal_len(16, 4).not_null())
                        .col(
                            ColumnDef::new(Orders::DiscountAmount)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::CouponCode).string().null())
                        .col(
                            ColumnDef::new(Orders::PaymentStatus)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::DeliveryStatus)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::TrackingNumber).string().null())
                        .col(ColumnDef::new(Orders::CourierName).string().null())
                        .col(ColumnDef::new(Orders::EstimatedDelivery).string().null())
                        .col(ColumnDef::new(Orders::TrackingUpdates).json().not_null())
                        .col(ColumnDef::new(Orders::ShippingAddress).json().not_null())
                        .col(ColumnDef::new(Orders::Items).json().not_null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_user_id")
                        .table(Orders::Table)
                        .col(Orders::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_delivery_status")
                        .table(Orders::Table)
                        .col(Orders::DeliveryStatus)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Orders {
        Table,
        Id,
        UserId,
        RazorpayOrderId,
        RazorpayPaymentId,
        Amount,
        DiscountAmount,
        CouponCode,
        PaymentStatus,
        DeliveryStatus,
        TrackingNumber,
        CourierName,
        EstimatedDelivery,
        TrackingUpdates,
        ShippingAddress,
        Items,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250601_000003_create_coupons_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000003_create_coupons_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Coupons::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Coupons::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Coupons::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Coupons::DiscountPercent).integer().not_null())
                        .col(
                            ColumnDef::new(Coupons::MinOrderValue)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Coupons::ExpiresAt).timestamp().null())
                        .col(
                            ColumnDef::new(Coupons::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Coupons::UsageLimit).integer().null())
                        .col(
                            ColumnDef::new(Coupons::UsedCount)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Coupons::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Coupons::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Coupons {
        Table,
        Id,
        Code,
        DiscountPercent,
        MinOrderValue,
        ExpiresAt,
        IsActive,
        UsageLimit,
        UsedCount,
        CreatedAt,
    }
}

mod m20250601_000004_create_blog_posts_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000004_create_blog_posts_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BlogPosts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(BlogPosts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(BlogPosts::Title).string().not_null())
                        .col(
                            ColumnDef::new(BlogPosts::Slug)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(BlogPosts::Excerpt).text().null())
                        .col(ColumnDef::new(BlogPosts::Content).text().null())
                        .col(ColumnDef::new(BlogPosts::Image).string().null())
                        .col(ColumnDef::new(BlogPosts::Category).string().null())
                        .col(ColumnDef::new(BlogPosts::Author).string().null())
                        .col(
                            ColumnDef::new(BlogPosts::IsPublished)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(BlogPosts::PublishedAt).timestamp().null())
                        .col(ColumnDef::new(BlogPosts::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(BlogPosts::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BlogPosts::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum BlogPosts {
        Table,
        Id,
        Title,
        Slug,
        Excerpt,
        Content,
        Image,
        Category,
        Author,
        IsPublished,
        PublishedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250601_000005_create_reviews_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000005_create_reviews_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reviews::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Reviews::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Reviews::ProductId).uuid().not_null())
                        .col(ColumnDef::new(Reviews::Name).string().not_null())
                        .col(ColumnDef::new(Reviews::Email).string().null())
                        .col(ColumnDef::new(Reviews::Heading).string().null())
                        .col(ColumnDef::new(Reviews::Rating).integer().not_null())
                        .col(ColumnDef::new(Reviews::Comment).text().not_null())
                        .col(ColumnDef::new(Reviews::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Reviews::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reviews_product_id")
                        .table(Reviews::Table)
                        .col(Reviews::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reviews::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Reviews {
        Table,
        Id,
        ProductId,
        Name,
        Email,
        Heading,
        Rating,
        Comment,
        Status,
        CreatedAt,
    }
}

mod m20250601_000006_create_store_settings_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000006_create_store_settings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StoreSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StoreSettings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StoreSettings::General).json().not_null())
                        .col(ColumnDef::new(StoreSettings::Shipping).json().not_null())
                        .col(
                            ColumnDef::new(StoreSettings::Notifications)
                                .json()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StoreSettings::Social).json().not_null())
                        .col(ColumnDef::new(StoreSettings::Payment).json().not_null())
                        .col(
                            ColumnDef::new(StoreSettings::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StoreSettings::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum StoreSettings {
        Table,
        Id,
        General,
        Shipping,
        Notifications,
        Social,
        Payment,
        UpdatedAt,
    }
}

mod m20250601_000007_create_cms_content_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250601_000007_create_cms_content_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CmsContent::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CmsContent::Key)
                                .string()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CmsContent::Value).json().not_null())
                        .col(ColumnDef::new(CmsContent::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CmsContent::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum CmsContent {
        Table,
        Key,
        Value,
        UpdatedAt,
    }
}
