use crate::domain::{models::member::Member, ports::MemberRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresMemberRepo {
    pool: PgPool,
}

impl PostgresMemberRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepo {
    async fn create(&self, member: &Member) -> Result<Member, AppError> {
        sqlx::query_as::<_, Member>(
            "INSERT INTO members (id, name, email, membership, role, is_active, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
            .bind(&member.id)
            .bind(&member.name)
            .bind(&member.email)
            .bind(&member.membership)
            .bind(&member.role)
            .bind(member.is_active)
            .bind(member.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Member>, AppError> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<Member>, AppError> {
        sqlx::query_as::<_, Member>("SELECT * FROM members ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
