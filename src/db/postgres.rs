use async_trait::async_trait;

use crate::{
    db::{DbError, PaymentCodesDB},
    db_pool::DbPool,
    models::PaymentCode,
    schema,
};

#[derive(Clone)]
pub struct PostgresDb {
    db: DbPool,
}

impl PostgresDb {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentCodesDB for PostgresDb {
    async fn create(&self, code: &PaymentCode) -> Result<PaymentCode, DbError> {
        use diesel::SelectableHelper;
        use diesel_async::RunQueryDsl;

        let row = diesel::insert_into(schema::payment_codes::table)
            .values(code)
            .returning(PaymentCode::as_returning())
            .get_result(&mut self.db.0.get().await?)
            .await?;

        Ok(row)
    }

    async fn get(&self, id: &str) -> Result<Option<PaymentCode>, DbError> {
        use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
        use diesel_async::RunQueryDsl;

        Ok(schema::payment_codes::table
            .filter(schema::payment_codes::id.eq(id))
            .select(PaymentCode::as_select())
            .first(&mut self.db.0.get().await?)
            .await
            .optional()?)
    }
}
