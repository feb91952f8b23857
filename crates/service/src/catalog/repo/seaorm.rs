use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};

use models::{service, service_version};

use crate::catalog::domain::{Service, ServiceVersion, SortDirection, SortField};
use crate::catalog::repository::CatalogRepository;
use crate::errors::StoreError;

pub struct SeaOrmCatalogRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

/// `%` `_` and the escape char itself are matched literally
fn like_pattern(search: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

fn matching(search: &str) -> Select<service::Entity> {
    let query = service::Entity::find();
    if search.is_empty() {
        return query;
    }
    query.filter(
        Condition::any()
            .add(Expr::col(service::Column::Name).like(like_pattern(search)))
            .add(Expr::col(service::Column::Description).like(like_pattern(search))),
    )
}

fn sort_column(field: SortField) -> service::Column {
    match field {
        SortField::Name => service::Column::Name,
        SortField::CreatedAt => service::Column::CreatedAt,
        SortField::UpdatedAt => service::Column::UpdatedAt,
    }
}

fn sort_order(dir: SortDirection) -> Order {
    match dir {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    }
}

#[async_trait::async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn count_matching(&self, search: &str) -> Result<u64, StoreError> {
        Ok(matching(search).count(&self.db).await?)
    }

    async fn list_matching(
        &self,
        search: &str,
        sort_by: SortField,
        sort_dir: SortDirection,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Service>, StoreError> {
        let rows = matching(search)
            .order_by(sort_column(sort_by), sort_order(sort_dir))
            // 同名/同时间时按 id 稳定排序，保证重复查询结果一致
            .order_by(service::Column::Id, Order::Asc)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    async fn versions_of(&self, service_id: i32) -> Result<Vec<ServiceVersion>, StoreError> {
        let rows = service_version::Entity::find()
            .filter(service_version::Column::ServiceId.eq(service_id))
            .order_by_desc(service_version::Column::CreatedAt)
            .order_by_desc(service_version::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(ServiceVersion::from).collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Service>, StoreError> {
        let row = service::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Service::from))
    }
}
