use crate::{
    config::AuthSettings,
    db::{DbPool, OrmConn, create_pool, orm_from_pool},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub auth: AuthSettings,
}

impl AppState {
    pub async fn connect(database_url: &str, auth: AuthSettings) -> anyhow::Result<Self> {
        let pool = create_pool(database_url).await?;
        let orm = orm_from_pool(&pool);
        Ok(Self { pool, orm, auth })
    }
}
