use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_clients_table::Migration),
            Box::new(m20240101_000002_create_products_table::Migration),
            Box::new(m20240101_000003_create_product_components_table::Migration),
            Box::new(m20240101_000004_create_projects_table::Migration),
            Box::new(m20240101_000005_create_project_items_table::Migration),
            Box::new(m20240101_000006_create_transactions_table::Migration),
            Box::new(m20240101_000007_create_stock_movements_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_clients_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_clients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Clients::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Clients::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Clients::Name).string().not_null())
                        .col(ColumnDef::new(Clients::PersonType).string().not_null())
                        .col(ColumnDef::new(Clients::Document).string().null())
                        .col(ColumnDef::new(Clients::Email).string().not_null())
                        .col(ColumnDef::new(Clients::Phone).string().null())
                        .col(ColumnDef::new(Clients::Mobile).string().null())
                        .col(ColumnDef::new(Clients::CompanyName).string().null())
                        .col(ColumnDef::new(Clients::StateRegistration).string().null())
                        .col(ColumnDef::new(Clients::Street).string().null())
                        .col(ColumnDef::new(Clients::Number).string().null())
                        .col(ColumnDef::new(Clients::Complement).string().null())
                        .col(ColumnDef::new(Clients::Neighborhood).string().null())
                        .col(ColumnDef::new(Clients::City).string().null())
                        .col(ColumnDef::new(Clients::State).string().null())
                        .col(ColumnDef::new(Clients::ZipCode).string().null())
                        .col(ColumnDef::new(Clients::Country).string().null())
                        .col(
                            ColumnDef::new(Clients::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Clients::TotalProjects)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Clients::TotalValue)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Clients::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Clients::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Clients {
        Table,
        Id,
        Name,
        PersonType,
        Document,
        Email,
        Phone,
        Mobile,
        CompanyName,
        StateRegistration,
        Street,
        Number,
        Complement,
        Neighborhood,
        City,
        State,
        ZipCode,
        Country,
        Active,
        TotalProjects,
        TotalValue,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_products_table"
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
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).string().null())
                        .col(ColumnDef::new(Products::Category).string().null())
                        .col(ColumnDef::new(Products::ProductType).string().not_null())
                        .col(ColumnDef::new(Products::Unit).string().not_null())
                        .col(
                            ColumnDef::new(Products::CostPrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::SalePrice).decimal().null())
                        .col(
                            ColumnDef::new(Products::CurrentStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::MinStock)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Products::Supplier).string().null())
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_products_product_type")
                        .table(Products::Table)
                        .col(Products::ProductType)
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
    pub enum Products {
        Table,
        Id,
        Name,
        Description,
        Category,
        ProductType,
        Unit,
        CostPrice,
        SalePrice,
        CurrentStock,
        MinStock,
        Supplier,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_product_components_table {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000002_create_products_table::Products;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_product_components_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductComponents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductComponents::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductComponents::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(ProductComponents::ComponentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductComponents::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductComponents::Unit).string().not_null())
                        .col(
                            ColumnDef::new(ProductComponents::UnitCost)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductComponents::TotalCost)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductComponents::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductComponents::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_components_product")
                                .from(ProductComponents::Table, ProductComponents::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_components_component")
                                .from(ProductComponents::Table, ProductComponents::ComponentId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_product_components_product_id")
                        .table(ProductComponents::Table)
                        .col(ProductComponents::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_product_components_component_id")
                        .table(ProductComponents::Table)
                        .col(ProductComponents::ComponentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductComponents::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum ProductComponents {
        Table,
        Id,
        ProductId,
        ComponentId,
        Quantity,
        Unit,
        UnitCost,
        TotalCost,
        Position,
        CreatedAt,
    }
}

mod m20240101_000004_create_projects_table {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_clients_table::Clients;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_projects_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Projects::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Projects::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Projects::Number).big_integer().not_null())
                        .col(ColumnDef::new(Projects::ClientId).uuid().not_null())
                        .col(ColumnDef::new(Projects::ClientName).string().not_null())
                        .col(ColumnDef::new(Projects::Title).string().not_null())
                        .col(ColumnDef::new(Projects::Description).string().null())
                        .col(ColumnDef::new(Projects::Status).string().not_null())
                        .col(ColumnDef::new(Projects::ProjectType).string().not_null())
                        .col(
                            ColumnDef::new(Projects::Budget)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Projects::StartDate).date().null())
                        .col(ColumnDef::new(Projects::EndDate).date().null())
                        .col(ColumnDef::new(Projects::MaterialsCost).decimal().null())
                        .col(ColumnDef::new(Projects::LaborCost).decimal().null())
                        .col(ColumnDef::new(Projects::ProfitMargin).decimal().null())
                        .col(ColumnDef::new(Projects::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Projects::UpdatedAt).timestamp().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_projects_client")
                                .from(Projects::Table, Projects::ClientId)
                                .to(Clients::Table, Clients::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_projects_client_id")
                        .table(Projects::Table)
                        .col(Projects::ClientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Projects::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Projects {
        Table,
        Id,
        Number,
        ClientId,
        ClientName,
        Title,
        Description,
        Status,
        ProjectType,
        Budget,
        StartDate,
        EndDate,
        MaterialsCost,
        LaborCost,
        ProfitMargin,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_project_items_table {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000002_create_products_table::Products;
    use super::m20240101_000004_create_projects_table::Projects;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_project_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProjectItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProjectItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProjectItems::ProjectId).uuid().not_null())
                        .col(ColumnDef::new(ProjectItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(ProjectItems::ProductName).string().not_null())
                        .col(ColumnDef::new(ProjectItems::Quantity).decimal().not_null())
                        .col(ColumnDef::new(ProjectItems::UnitPrice).decimal().not_null())
                        .col(ColumnDef::new(ProjectItems::TotalPrice).decimal().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_project_items_project")
                                .from(ProjectItems::Table, ProjectItems::ProjectId)
                                .to(Projects::Table, Projects::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_project_items_product")
                                .from(ProjectItems::Table, ProjectItems::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_project_items_project_id")
                        .table(ProjectItems::Table)
                        .col(ProjectItems::ProjectId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProjectItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum ProjectItems {
        Table,
        Id,
        ProjectId,
        ProductId,
        ProductName,
        Quantity,
        UnitPrice,
        TotalPrice,
    }
}

mod m20240101_000006_create_transactions_table {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000004_create_projects_table::Projects;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Transactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Transactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transactions::ProjectId).uuid().null())
                        .col(ColumnDef::new(Transactions::ProjectTitle).string().null())
                        .col(
                            ColumnDef::new(Transactions::TransactionType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transactions::Category).string().not_null())
                        .col(ColumnDef::new(Transactions::Description).string().not_null())
                        .col(ColumnDef::new(Transactions::Amount).decimal().not_null())
                        .col(ColumnDef::new(Transactions::Date).date().not_null())
                        .col(ColumnDef::new(Transactions::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_project")
                                .from(Transactions::Table, Transactions::ProjectId)
                                .to(Projects::Table, Projects::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_transactions_project_id")
                        .table(Transactions::Table)
                        .col(Transactions::ProjectId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Transactions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Transactions {
        Table,
        Id,
        ProjectId,
        ProjectTitle,
        TransactionType,
        Category,
        Description,
        Amount,
        Date,
        CreatedAt,
    }
}

mod m20240101_000007_create_stock_movements_table {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000002_create_products_table::Products;
    use super::m20240101_000004_create_projects_table::Projects;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_stock_movements_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(StockMovements::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockMovements::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockMovements::ProductName)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockMovements::MovementType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::Quantity).decimal().not_null())
                        .col(ColumnDef::new(StockMovements::UnitPrice).decimal().null())
                        .col(ColumnDef::new(StockMovements::TotalValue).decimal().null())
                        .col(ColumnDef::new(StockMovements::ProjectId).uuid().null())
                        .col(
                            ColumnDef::new(StockMovements::ReferenceType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockMovements::Date).date().not_null())
                        .col(
                            ColumnDef::new(StockMovements::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_movements_product")
                                .from(StockMovements::Table, StockMovements::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_movements_project")
                                .from(StockMovements::Table, StockMovements::ProjectId)
                                .to(Projects::Table, Projects::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_movements_product_id")
                        .table(StockMovements::Table)
                        .col(StockMovements::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_stock_movements_project_id")
                        .table(StockMovements::Table)
                        .col(StockMovements::ProjectId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockMovements::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum StockMovements {
        Table,
        Id,
        ProductId,
        ProductName,
        MovementType,
        Quantity,
        UnitPrice,
        TotalValue,
        ProjectId,
        ReferenceType,
        Date,
        CreatedAt,
    }
}
