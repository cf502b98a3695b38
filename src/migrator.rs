use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220101_000001_create_marca_table::Migration),
            Box::new(m20220101_000002_create_modelo_table::Migration),
        ]
    }
}

// Migration implementations

mod m20220101_000001_create_marca_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20220101_000001_create_marca_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Marca::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Marca::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Marca::Marca).string_len(20).not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Marca::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Marca {
        Table,
        Id,
        Marca,
    }
}

mod m20220101_000002_create_modelo_table {

    use super::m20220101_000001_create_marca_table::Marca;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20220101_000002_create_modelo_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Modelo::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Modelo::Id)
                                .big_integer()
                                .primary_key()
                                .auto_increment()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Modelo::Modelo).string_len(50).not_null())
                        .col(ColumnDef::new(Modelo::Color).string().null())
                        .col(ColumnDef::new(Modelo::Potencia).integer().null())
                        .col(ColumnDef::new(Modelo::Plazas).integer().null())
                        .col(ColumnDef::new(Modelo::Precio).double().null())
                        .col(ColumnDef::new(Modelo::NumeroSerie).string().null())
                        .col(ColumnDef::new(Modelo::MarcaId).big_integer().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_modelo_marca_id")
                                .from(Modelo::Table, Modelo::MarcaId)
                                .to(Marca::Table, Marca::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_modelo_marca_id")
                        .table(Modelo::Table)
                        .col(Modelo::MarcaId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Modelo::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Modelo {
        Table,
        Id,
        Modelo,
        Color,
        Potencia,
        Plazas,
        Precio,
        NumeroSerie,
        MarcaId,
    }
}
