//! Schema synchronisation for development databases.
//!
//! Creates any missing table straight from the entity definitions, in
//! foreign-key order. Existing tables are left untouched; production schemas
//! are managed outside the server.

use sea_orm::{ConnectionTrait, DbConn, DbErr, EntityName, EntityTrait, Schema};

use super::entity::{category, comment, post, user};

pub async fn sync(db: &DbConn) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, user::Entity).await?;
    create_table(db, &schema, category::Entity).await?;
    create_table(db, &schema, post::Entity).await?;
    create_table(db, &schema, comment::Entity).await?;

    tracing::info!("Database schema synchronised");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DbConn, schema: &Schema, entity: E) -> Result<(), DbErr> {
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();

    db.execute(db.get_database_backend().build(&stmt)).await?;
    tracing::debug!(table = %entity.table_name(), "Ensured table exists");
    Ok(())
}
