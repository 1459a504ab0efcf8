use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_directory_tables::Migration),
            Box::new(m20240301_000002_create_order_tables::Migration),
            Box::new(m20240301_000003_create_ledger_tables::Migration),
            Box::new(m20240301_000004_create_dump_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_directory_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_directory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(ColumnDef::new(Users::Email).string().not_null())
                        .col(ColumnDef::new(Users::Phone).string().not_null())
                        .col(ColumnDef::new(Users::Status).string_len(16).not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Admins::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Admins::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Admins::UserId).big_integer().not_null())
                        .col(ColumnDef::new(Admins::Role).string().not_null())
                        .col(ColumnDef::new(Admins::Status).string_len(16).not_null())
                        .col(
                            ColumnDef::new(Admins::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Admins::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_admins_user_id")
                                .from(Admins::Table, Admins::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_admins_user_id")
                        .table(Admins::Table)
                        .col(Admins::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Units::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Units::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Units::Name).string().not_null())
                        .col(
                            ColumnDef::new(Units::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Units::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customers::UserId).big_integer().not_null())
                        .col(ColumnDef::new(Customers::UnitId).big_integer().not_null())
                        .col(ColumnDef::new(Customers::Type).string().not_null())
                        .col(ColumnDef::new(Customers::Status).string().not_null())
                        .col(ColumnDef::new(Customers::CreatedBy).string().not_null())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_customers_user_id")
                                .from(Customers::Table, Customers::UserId)
                                .to(Users::Table, Users::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_customers_unit_id")
                                .from(Customers::Table, Customers::UnitId)
                                .to(Units::Table, Units::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Vendors::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Vendors::UserId).big_integer().not_null())
                        .col(ColumnDef::new(Vendors::Address).string().not_null())
                        .col(ColumnDef::new(Vendors::Status).string().not_null())
                        .col(
                            ColumnDef::new(Vendors::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Vendors::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_vendors_user_id")
                                .from(Vendors::Table, Vendors::UserId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Menus::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Menus::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Menus::VendorId).big_integer().not_null())
                        .col(ColumnDef::new(Menus::Name).string().not_null())
                        .col(
                            ColumnDef::new(Menus::RetailPrice)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Menus::Cogs).decimal_len(16, 2).not_null())
                        .col(
                            ColumnDef::new(Menus::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Menus::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_menus_vendor_id")
                                .from(Menus::Table, Menus::VendorId)
                                .to(Vendors::Table, Vendors::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_menus_vendor_id")
                        .table(Menus::Table)
                        .col(Menus::VendorId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Menus::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Units::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Admins::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Users {
        Table,
        Id,
        Name,
        Email,
        Phone,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Admins {
        Table,
        Id,
        UserId,
        Role,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Units {
        Table,
        Id,
        Name,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
        UserId,
        UnitId,
        Type,
        Status,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Vendors {
        Table,
        Id,
        UserId,
        Address,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Menus {
        Table,
        Id,
        VendorId,
        Name,
        RetailPrice,
        Cogs,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_order_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_order_tables"
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
                        .col(
                            ColumnDef::new(Orders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::OrderedBy).big_integer().not_null())
                        .col(
                            ColumnDef::new(Orders::OrderedFor)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::OrderedTo).string().not_null())
                        .col(
                            ColumnDef::new(Orders::NumOfMenus)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::QtyOfMenus)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::Amount)
                                .decimal_len(16, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::Purpose).string().not_null())
                        .col(ColumnDef::new(Orders::Activity).string().not_null())
                        .col(ColumnDef::new(Orders::SourceOfFund).string().not_null())
                        .col(ColumnDef::new(Orders::PaymentOption).string().not_null())
                        .col(ColumnDef::new(Orders::Info).text().not_null())
                        .col(ColumnDef::new(Orders::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Orders::PaidByCustomerAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::CreatedBy).string().not_null())
                        .col(ColumnDef::new(Orders::UpdatedBy).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_ordered_by")
                                .from(Orders::Table, Orders::OrderedBy)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_ordered_by")
                        .table(Orders::Table)
                        .col(Orders::OrderedBy)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderDetails::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderDetails::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(OrderDetails::OrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderDetails::MenuId).big_integer().not_null())
                        .col(ColumnDef::new(OrderDetails::Qty).integer().not_null())
                        .col(
                            ColumnDef::new(OrderDetails::Price)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetails::Cogs)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetails::Note)
                                .text()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(OrderDetails::Status).string_len(16).not_null())
                        .col(
                            ColumnDef::new(OrderDetails::ReasonForCancellation)
                                .text()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetails::PaidToVendorAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetails::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetails::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderDetails::CreatedBy).string().not_null())
                        .col(ColumnDef::new(OrderDetails::UpdatedBy).string().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_details_order_id")
                                .from(OrderDetails::Table, OrderDetails::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_details_menu_id")
                                .from(OrderDetails::Table, OrderDetails::MenuId)
                                .to(Menus::Table, Menus::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_details_order_id")
                        .table(OrderDetails::Table)
                        .col(OrderDetails::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderDetails::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Customers {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Menus {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        OrderedBy,
        OrderedFor,
        OrderedTo,
        NumOfMenus,
        QtyOfMenus,
        Amount,
        Purpose,
        Activity,
        SourceOfFund,
        PaymentOption,
        Info,
        Status,
        PaidByCustomerAt,
        CreatedAt,
        UpdatedAt,
        CreatedBy,
        UpdatedBy,
    }

    #[derive(DeriveIden)]
    enum OrderDetails {
        Table,
        Id,
        OrderId,
        MenuId,
        Qty,
        Price,
        Cogs,
        Note,
        Status,
        ReasonForCancellation,
        PaidToVendorAt,
        CreatedAt,
        UpdatedAt,
        CreatedBy,
        UpdatedBy,
    }
}

mod m20240301_000003_create_ledger_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_ledger_tables"
        }
    }

    /// Costs and discounts share one shape, only the table differs.
    fn ledger_table(table: Ledger) -> TableCreateStatement {
        let fk_name = format!("fk_{}_order_detail_id", table.to_string());
        Table::create()
            .table(table)
            .if_not_exists()
            .col(
                ColumnDef::new(Ledger::Id)
                    .big_integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Ledger::OrderDetailId).big_integer().not_null())
            .col(ColumnDef::new(Ledger::Amount).decimal_len(16, 2).not_null())
            .col(ColumnDef::new(Ledger::Reason).text().not_null())
            .col(ColumnDef::new(Ledger::Issuer).string_len(16).not_null())
            .col(ColumnDef::new(Ledger::Status).string_len(16).not_null())
            .col(
                ColumnDef::new(Ledger::CreatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Ledger::UpdatedAt)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(ColumnDef::new(Ledger::CreatedBy).string().not_null())
            .foreign_key(
                ForeignKey::create()
                    .name(fk_name)
                    .from(table, Ledger::OrderDetailId)
                    .to(OrderDetails::Table, OrderDetails::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned()
    }

    fn ledger_index(table: Ledger) -> IndexCreateStatement {
        Index::create()
            .if_not_exists()
            .name(format!("idx_{}_order_detail_id", table.to_string()))
            .table(table)
            .col(Ledger::OrderDetailId)
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [Ledger::Costs, Ledger::Discounts] {
                manager.create_table(ledger_table(table)).await?;
                manager.create_index(ledger_index(table)).await?;
            }
            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            for table in [Ledger::Discounts, Ledger::Costs] {
                manager
                    .drop_table(Table::drop().table(table).to_owned())
                    .await?;
            }
            Ok(())
        }
    }

    #[derive(DeriveIden)]
    enum OrderDetails {
        Table,
        Id,
    }

    #[derive(Clone, Copy, DeriveIden)]
    enum Ledger {
        Costs,
        Discounts,
        Id,
        OrderDetailId,
        Amount,
        Reason,
        Issuer,
        Status,
        CreatedAt,
        UpdatedAt,
        CreatedBy,
    }
}

mod m20240301_000004_create_dump_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_dump_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderDumps::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderDumps::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OrderDumps::SourceId).big_integer().not_null())
                        .col(ColumnDef::new(OrderDumps::OrderedBy).big_integer().not_null())
                        .col(
                            ColumnDef::new(OrderDumps::OrderedFor)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderDumps::OrderedTo).string().not_null())
                        .col(ColumnDef::new(OrderDumps::NumOfMenus).integer().not_null())
                        .col(ColumnDef::new(OrderDumps::QtyOfMenus).integer().not_null())
                        .col(
                            ColumnDef::new(OrderDumps::Amount)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderDumps::Purpose).string().not_null())
                        .col(ColumnDef::new(OrderDumps::Activity).string().not_null())
                        .col(ColumnDef::new(OrderDumps::SourceOfFund).string().not_null())
                        .col(ColumnDef::new(OrderDumps::PaymentOption).string().not_null())
                        .col(ColumnDef::new(OrderDumps::Info).text().not_null())
                        .col(ColumnDef::new(OrderDumps::Status).string_len(32).not_null())
                        .col(
                            ColumnDef::new(OrderDumps::PaidByCustomerAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderDumps::SourceCreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDumps::SourceUpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderDumps::CreatedBy).string().not_null())
                        .col(
                            ColumnDef::new(OrderDumps::DumpedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderDumps::DumpedBy).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderDetailDumps::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderDetailDumps::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(OrderDetailDumps::SourceId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetailDumps::OrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetailDumps::MenuId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderDetailDumps::Qty).integer().not_null())
                        .col(
                            ColumnDef::new(OrderDetailDumps::Price)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetailDumps::Cogs)
                                .decimal_len(16, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderDetailDumps::Note).text().not_null())
                        .col(
                            ColumnDef::new(OrderDetailDumps::Status)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetailDumps::ReasonForCancellation)
                                .text()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetailDumps::PaidToVendorAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetailDumps::SourceCreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetailDumps::SourceUpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetailDumps::CreatedBy)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetailDumps::DumpedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderDetailDumps::DumpedBy)
                                .string()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_dumps_source_id")
                        .table(OrderDumps::Table)
                        .col(OrderDumps::SourceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderDetailDumps::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderDumps::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OrderDumps {
        Table,
        Id,
        SourceId,
        OrderedBy,
        OrderedFor,
        OrderedTo,
        NumOfMenus,
        QtyOfMenus,
        Amount,
        Purpose,
        Activity,
        SourceOfFund,
        PaymentOption,
        Info,
        Status,
        PaidByCustomerAt,
        SourceCreatedAt,
        SourceUpdatedAt,
        CreatedBy,
        DumpedAt,
        DumpedBy,
    }

    #[derive(DeriveIden)]
    enum OrderDetailDumps {
        Table,
        Id,
        SourceId,
        OrderId,
        MenuId,
        Qty,
        Price,
        Cogs,
        Note,
        Status,
        ReasonForCancellation,
        PaidToVendorAt,
        SourceCreatedAt,
        SourceUpdatedAt,
        CreatedBy,
        DumpedAt,
        DumpedBy,
    }
}
