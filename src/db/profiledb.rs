// db/profiledb.rs
use async_trait::async_trait;
use sqlx::{Error, Postgres, Transaction};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::profilemodel::{BusinessProfile, WorkerProfile};

#[async_trait]
pub trait ProfileExt {
    async fn upsert_worker_profile(
        &self,
        user_id: Uuid,
        headline: String,
        bio: String,
        skills: Vec<String>,
        hourly_rate_cents: Option<i64>,
        phone: Option<String>,
        city: String,
    ) -> Result<WorkerProfile, Error>;

    async fn get_worker_profile(&self, user_id: Uuid) -> Result<Option<WorkerProfile>, Error>;

    async fn set_worker_flags(
        &self,
        user_id: Uuid,
        is_verified: Option<bool>,
        is_suspended: Option<bool>,
    ) -> Result<WorkerProfile, Error>;

    async fn upsert_business_profile(
        &self,
        user_id: Uuid,
        company_name: String,
        industry: String,
        address: String,
        city: String,
        contact_phone: Option<String>,
    ) -> Result<BusinessProfile, Error>;

    async fn get_business_profile(&self, user_id: Uuid) -> Result<Option<BusinessProfile>, Error>;
}

#[async_trait]
impl ProfileExt for DBClient {
    async fn upsert_worker_profile(
        &self,
        user_id: Uuid,
        headline: String,
        bio: String,
        skills: Vec<String>,
        hourly_rate_cents: Option<i64>,
        phone: Option<String>,
        city: String,
    ) -> Result<WorkerProfile, Error> {
        sqlx::query_as::<_, WorkerProfile>(
            r#"
            INSERT INTO worker_profiles (user_id, headline, bio, skills, hourly_rate_cents, phone, city)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                headline = EXCLUDED.headline,
                bio = EXCLUDED.bio,
                skills = EXCLUDED.skills,
                hourly_rate_cents = EXCLUDED.hourly_rate_cents,
                phone = EXCLUDED.phone,
                city = EXCLUDED.city,
                updated_at = NOW()
            RETURNING *
            "#
        )
        .bind(user_id)
        .bind(headline)
        .bind(bio)
        .bind(skills)
        .bind(hourly_rate_cents)
        .bind(phone)
        .bind(city)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_worker_profile(&self, user_id: Uuid) -> Result<Option<WorkerProfile>, Error> {
        sqlx::query_as::<_, WorkerProfile>("SELECT * FROM worker_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn set_worker_flags(
        &self,
        user_id: Uuid,
        is_verified: Option<bool>,
        is_suspended: Option<bool>,
    ) -> Result<WorkerProfile, Error> {
        sqlx::query_as::<_, WorkerProfile>(
            r#"
            UPDATE worker_profiles
            SET is_verified = COALESCE($2, is_verified),
                is_suspended = COALESCE($3, is_suspended),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            "#
        )
        .bind(user_id)
        .bind(is_verified)
        .bind(is_suspended)
        .fetch_one(&self.pool)
        .await
    }

    async fn upsert_business_profile(
        &self,
        user_id: Uuid,
        company_name: String,
        industry: String,
        address: String,
        city: String,
        contact_phone: Option<String>,
    ) -> Result<BusinessProfile, Error> {
        sqlx::query_as::<_, BusinessProfile>(
            r#"
            INSERT INTO business_profiles (user_id, company_name, industry, address, city, contact_phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                company_name = EXCLUDED.company_name,
                industry = EXCLUDED.industry,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                contact_phone = EXCLUDED.contact_phone,
                updated_at = NOW()
            RETURNING *
            "#
        )
        .bind(user_id)
        .bind(company_name)
        .bind(industry)
        .bind(address)
        .bind(city)
        .bind(contact_phone)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_business_profile(&self, user_id: Uuid) -> Result<Option<BusinessProfile>, Error> {
        sqlx::query_as::<_, BusinessProfile>("SELECT * FROM business_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }
}

/// Profile read on the caller's transaction, so an accept holds one connection.
pub async fn get_worker_profile_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<Option<WorkerProfile>, Error> {
    sqlx::query_as::<_, WorkerProfile>("SELECT * FROM worker_profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
}
