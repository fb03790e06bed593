use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_actor_tables::Migration),
            Box::new(m20240301_000002_create_station_tables::Migration),
            Box::new(m20240301_000003_create_orders_table::Migration),
            Box::new(m20240301_000004_create_feedback_table::Migration),
        ]
    }
}

mod m20240301_000001_create_actor_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_actor_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Dealers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Dealers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Dealers::Name).string().not_null())
                        .col(ColumnDef::new(Dealers::Email).string().not_null().unique_key())
                        .col(ColumnDef::new(Dealers::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Dealers::Phone).string().not_null())
                        .col(
                            ColumnDef::new(Dealers::CreatedAt)
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
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Customers::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Customers::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Customers::Phone).string().not_null())
                        .col(ColumnDef::new(Customers::Address).text().not_null())
                        .col(ColumnDef::new(Customers::City).string().not_null())
                        .col(ColumnDef::new(Customers::State).string().not_null())
                        .col(ColumnDef::new(Customers::Pincode).string().not_null())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(DeliveryAgents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(DeliveryAgents::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(DeliveryAgents::Name).string().not_null())
                        .col(
                            ColumnDef::new(DeliveryAgents::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(DeliveryAgents::PasswordHash)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(DeliveryAgents::Phone).string().not_null())
                        .col(
                            ColumnDef::new(DeliveryAgents::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DeliveryAgents::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Dealers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Dealers {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Phone,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Phone,
        Address,
        City,
        State,
        Pincode,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum DeliveryAgents {
        Table,
        Id,
        Name,
        Email,
        PasswordHash,
        Phone,
        CreatedAt,
    }
}

mod m20240301_000002_create_station_tables {
    use super::m20240301_000001_create_actor_tables::Dealers;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_station_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FuelStations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FuelStations::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(FuelStations::DealerId).integer().not_null())
                        .col(ColumnDef::new(FuelStations::Name).string().not_null())
                        .col(ColumnDef::new(FuelStations::Address).text().not_null())
                        .col(ColumnDef::new(FuelStations::City).string().not_null())
                        .col(ColumnDef::new(FuelStations::State).string().not_null())
                        .col(ColumnDef::new(FuelStations::Pincode).string().not_null())
                        .col(ColumnDef::new(FuelStations::ContactNumber).string().null())
                        .col(
                            ColumnDef::new(FuelStations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_fuel_stations_dealer_id")
                                .from(FuelStations::Table, FuelStations::DealerId)
                                .to(Dealers::Table, Dealers::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_fuel_stations_dealer_id")
                        .table(FuelStations::Table)
                        .col(FuelStations::DealerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_fuel_stations_location")
                        .table(FuelStations::Table)
                        .col(FuelStations::City)
                        .col(FuelStations::State)
                        .col(FuelStations::Pincode)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(FuelPrices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FuelPrices::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(FuelPrices::StationId)
                                .integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(FuelPrices::PetrolPrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(FuelPrices::DieselPrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(FuelPrices::CngPrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(FuelPrices::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_fuel_prices_station_id")
                                .from(FuelPrices::Table, FuelPrices::StationId)
                                .to(FuelStations::Table, FuelStations::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FuelPrices::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(FuelStations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum FuelStations {
        Table,
        Id,
        DealerId,
        Name,
        Address,
        City,
        State,
        Pincode,
        ContactNumber,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum FuelPrices {
        Table,
        Id,
        StationId,
        PetrolPrice,
        DieselPrice,
        CngPrice,
        UpdatedAt,
    }
}

mod m20240301_000003_create_orders_table {
    use super::m20240301_000001_create_actor_tables::{Customers, DeliveryAgents};
    use super::m20240301_000002_create_station_tables::FuelStations;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_orders_table"
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
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Orders::CustomerId).integer().not_null())
                        .col(ColumnDef::new(Orders::StationId).integer().not_null())
                        .col(ColumnDef::new(Orders::DeliveryAgentId).integer().null())
                        .col(ColumnDef::new(Orders::FuelType).string_len(16).not_null())
                        .col(ColumnDef::new(Orders::Quantity).decimal_len(12, 3).not_null())
                        .col(ColumnDef::new(Orders::UnitPrice).decimal_len(12, 2).not_null())
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal_len(18, 5)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::DeliveryAddress).text().not_null())
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string_len(32)
                                .not_null()
                                .default("pending"),
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
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer_id")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_station_id")
                                .from(Orders::Table, Orders::StationId)
                                .to(FuelStations::Table, FuelStations::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_delivery_agent_id")
                                .from(Orders::Table, Orders::DeliveryAgentId)
                                .to(DeliveryAgents::Table, DeliveryAgents::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_station_id")
                        .table(Orders::Table)
                        .col(Orders::StationId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_agent_status")
                        .table(Orders::Table)
                        .col(Orders::DeliveryAgentId)
                        .col(Orders::Status)
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

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        CustomerId,
        StationId,
        DeliveryAgentId,
        FuelType,
        Quantity,
        UnitPrice,
        TotalAmount,
        DeliveryAddress,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000004_create_feedback_table {
    use super::m20240301_000001_create_actor_tables::Customers;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_feedback_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Feedback::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Feedback::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Feedback::CustomerId).integer().not_null())
                        .col(ColumnDef::new(Feedback::Message).text().not_null())
                        .col(
                            ColumnDef::new(Feedback::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_feedback_customer_id")
                                .from(Feedback::Table, Feedback::CustomerId)
                                .to(Customers::Table, Customers::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Feedback::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Feedback {
        Table,
        Id,
        CustomerId,
        Message,
        CreatedAt,
    }
}
