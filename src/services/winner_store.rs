use crate::database::DbPool;
use crate::entities::winner_entity as winners;
use crate::error::AppResult;
use crate::models::{UpsertOutcome, WinnerRecord};
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::collections::HashSet;

/// 以州为键的中奖者表，每个州最多一行
#[async_trait]
pub trait WinnerStore: Send + Sync {
    /// 当前已有中奖者的所有州
    async fn regions(&self) -> AppResult<HashSet<String>>;

    async fn get(&self, state: &str) -> AppResult<Option<WinnerRecord>>;

    /// 州不存在则插入；存在则替换 id / email。返回前已提交。
    async fn upsert(&self, record: &WinnerRecord) -> AppResult<UpsertOutcome>;

    /// 全部中奖者快照（按州排序）
    async fn all(&self) -> AppResult<Vec<WinnerRecord>>;
}

#[derive(Clone)]
pub struct SeaOrmWinnerStore {
    pool: DbPool,
}

impl SeaOrmWinnerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WinnerStore for SeaOrmWinnerStore {
    async fn regions(&self) -> AppResult<HashSet<String>> {
        let states: Vec<String> = winners::Entity::find()
            .select_only()
            .column(winners::Column::State)
            .into_tuple()
            .all(&self.pool)
            .await?;
        Ok(states.into_iter().collect())
    }

    async fn get(&self, state: &str) -> AppResult<Option<WinnerRecord>> {
        let model = winners::Entity::find()
            .filter(winners::Column::State.eq(state))
            .one(&self.pool)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn upsert(&self, record: &WinnerRecord) -> AppResult<UpsertOutcome> {
        let txn = self.pool.begin().await?;

        // 先按州读取，再决定插入还是更新
        let existing = winners::Entity::find()
            .filter(winners::Column::State.eq(record.state.as_str()))
            .one(&txn)
            .await?;

        let outcome = match existing {
            Some(current) if current.id == record.id && current.email == record.email => {
                UpsertOutcome::Unchanged
            }
            Some(_) => {
                // 主键 id 会变化，所以按 state 做 update_many 而不是 ActiveModel::update
                winners::Entity::update_many()
                    .col_expr(winners::Column::Id, Expr::value(record.id))
                    .col_expr(winners::Column::Email, Expr::value(record.email.clone()))
                    .filter(winners::Column::State.eq(record.state.as_str()))
                    .exec(&txn)
                    .await?;
                log::info!(
                    "Replaced winner from {} with new user {}",
                    record.state,
                    record.email
                );
                UpsertOutcome::Replaced
            }
            None => {
                winners::ActiveModel {
                    id: Set(record.id),
                    email: Set(record.email.clone()),
                    state: Set(record.state.clone()),
                }
                .insert(&txn)
                .await?;
                log::info!("Added new winner from {}: {}", record.state, record.email);
                UpsertOutcome::Inserted
            }
        };

        txn.commit().await?;
        Ok(outcome)
    }

    async fn all(&self) -> AppResult<Vec<WinnerRecord>> {
        let list = winners::Entity::find()
            .order_by_asc(winners::Column::State)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}
