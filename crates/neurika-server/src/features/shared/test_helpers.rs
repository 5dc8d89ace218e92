//! Row builders for database-backed tests
//!
//! ```rust,ignore
//! #[sqlx::test(migrations = "../../migrations")]
//! async fn test_something(pool: PgPool) -> sqlx::Result<()> {
//!     let admin = TestMember::new(TeamRole::Admin).insert(&pool).await?;
//!     let file = TestDataset::new(admin.user_id, "sales.csv").insert(&pool).await?;
//!     Ok(())
//! }
//! ```

use neurika_common::types::TeamRole;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct TestDataset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: Option<String>,
}

impl TestDataset {
    pub fn new(user_id: Uuid, file_name: &str) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            user_id,
            file_name: file_name.to_string(),
            file_path: format!("datasets/{}/{}_{}", user_id, id.as_u128() % 1_000_000, file_name),
            file_size: 128,
            mime_type: Some("text/csv".to_string()),
        }
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query(
            "INSERT INTO uploaded_files (id, user_id, file_name, file_path, file_size, mime_type, checksum)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(&self.file_name)
        .bind(&self.file_path)
        .bind(self.file_size)
        .bind(&self.mime_type)
        .bind("0".repeat(64))
        .execute(pool)
        .await?;
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct TestSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_id: Option<Uuid>,
    pub title: String,
}

impl TestSession {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            file_id: None,
            title: "New Analysis".to_string(),
        }
    }

    pub fn with_file(mut self, file_id: Uuid) -> Self {
        self.file_id = Some(file_id);
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query("INSERT INTO chat_sessions (id, user_id, file_id, title) VALUES ($1, $2, $3, $4)")
            .bind(self.id)
            .bind(self.user_id)
            .bind(self.file_id)
            .bind(&self.title)
            .execute(pool)
            .await?;
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct TestQaPair {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question: String,
    pub keywords: Vec<String>,
    pub observation: Option<String>,
    pub is_active: bool,
}

impl TestQaPair {
    pub fn new(user_id: Uuid, keywords: &[&str]) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            question: "Predefined question".to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            observation: Some("Stored observation".to_string()),
            is_active: true,
        }
    }

    pub fn with_observation(mut self, observation: &str) -> Self {
        self.observation = Some(observation.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query(
            "INSERT INTO qa_pairs (id, user_id, question, keywords, observation_content, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(&self.question)
        .bind(&self.keywords)
        .bind(&self.observation)
        .bind(self.is_active)
        .execute(pool)
        .await?;
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct TestMember {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub role: TeamRole,
}

impl TestMember {
    pub fn new(role: TeamRole) -> Self {
        let user_id = Uuid::new_v4();
        Self {
            id: Uuid::new_v4(),
            user_id,
            email: format!("{}@example.com", user_id.simple()),
            role,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = email.to_string();
        self
    }

    pub async fn insert(self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query("INSERT INTO user_roles (id, user_id, email, role) VALUES ($1, $2, $3, $4)")
            .bind(self.id)
            .bind(self.user_id)
            .bind(&self.email)
            .bind(self.role.as_str())
            .execute(pool)
            .await?;
        Ok(self)
    }
}
