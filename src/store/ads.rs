use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::posts::PageWindow;
use super::users::Author;
use super::{Id, Store, StoreError};

/// Advertisement with a `[start_date, end_date]` validity window at day
/// granularity. Uniqueness on (title, user_id) is enforced at the handler
/// boundary.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    // Integer minor units, as the payment provider expects.
    pub price: i64,
    pub duration: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdView {
    #[serde(flatten)]
    pub ad: Ad,
    pub user: Author,
}

impl Store {
    pub async fn insert_ad(&self, ad: &Ad) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO ads (id, user_id, title, body, image, price, duration, start_date, end_date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&ad.id)
        .bind(&ad.user_id)
        .bind(&ad.title)
        .bind(&ad.body)
        .bind(&ad.image)
        .bind(ad.price)
        .bind(ad.duration)
        .bind(ad.start_date)
        .bind(ad.end_date)
        .bind(ad.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn ad_by_id(&self, id: &Id) -> Result<Option<Ad>, StoreError> {
        let ad = sqlx::query_as::<_, Ad>("SELECT * FROM ads WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ad)
    }

    /// Lookup for the (title, user) uniqueness check.
    pub async fn ad_by_title_for_user(
        &self,
        title: &str,
        user_id: &Id,
    ) -> Result<Option<Ad>, StoreError> {
        let ad = sqlx::query_as::<_, Ad>("SELECT * FROM ads WHERE title = ? AND user_id = ?")
            .bind(title)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ad)
    }

    /// Total number of ads, optionally restricted to those whose validity
    /// window covers `active_on`, before any pagination window.
    pub async fn count_ads(&self, active_on: Option<NaiveDate>) -> Result<i64, StoreError> {
        let count = match active_on {
            Some(day) => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COUNT(*) FROM ads WHERE start_date <= ? AND end_date >= ?",
                )
                .bind(day)
                .bind(day)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ads")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    /// Ads newest first, optionally filtered to the ones active on a day and
    /// windowed.
    pub async fn list_ads(
        &self,
        active_on: Option<NaiveDate>,
        window: Option<PageWindow>,
    ) -> Result<Vec<Ad>, StoreError> {
        let mut sql = String::from("SELECT * FROM ads");
        if active_on.is_some() {
            sql.push_str(" WHERE start_date <= ? AND end_date >= ?");
        }
        sql.push_str(" ORDER BY created_at DESC");
        if window.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }

        let mut query = sqlx::query_as::<_, Ad>(&sql);
        if let Some(day) = active_on {
            query = query.bind(day).bind(day);
        }
        if let Some(window) = window {
            query = query.bind(window.limit).bind(window.offset);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    pub async fn delete_ad(&self, id: &Id) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM ads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Attaches each ad's author name pair.
    pub async fn enrich_ads(&self, ads: Vec<Ad>) -> Result<Vec<AdView>, StoreError> {
        if ads.is_empty() {
            return Ok(vec![]);
        }

        let mut author_ids: Vec<&Id> = ads.iter().map(|ad| &ad.user_id).collect();
        author_ids.sort_by_key(|id| id.as_str().to_string());
        author_ids.dedup();
        let authors = self.authors_for(&author_ids).await?;

        Ok(ads
            .into_iter()
            .map(|ad| {
                let user = authors.get(&ad.user_id).cloned().unwrap_or_default();
                AdView { ad, user }
            })
            .collect())
    }
}
