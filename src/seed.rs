use chrono::{Duration, NaiveDate, Utc};

use crate::{error::RepoError, repository::NewsRepository};

/// Number of items inserted by `seed_demo`. One more than the default page size, so the
/// home page limit is visible in a fresh local run.
pub const DEMO_NEWS_COUNT: i64 = 11;

/// seed_demo
///
/// Inserts `DEMO_NEWS_COUNT` news items dated today, yesterday, and so on backwards.
/// Returns the number of items created.
pub async fn seed_demo<R: NewsRepository + ?Sized>(repo: &R) -> Result<i64, RepoError> {
    let today = Utc::now().date_naive();
    for i in 0..DEMO_NEWS_COUNT {
        let date: NaiveDate = today - Duration::days(i);
        repo.create_news(&format!("Заголовок {i}"), &format!("Новость {i}"), date)
            .await?;
    }
    tracing::info!(count = DEMO_NEWS_COUNT, "seeded demo news");
    Ok(DEMO_NEWS_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;

    #[tokio::test]
    async fn seeded_news_have_distinct_dates() {
        let repo = InMemoryRepository::new();
        seed_demo(&repo).await.unwrap();

        let news = repo.list_news_ordered_by_date_desc(100).await;
        assert_eq!(news.len() as i64, DEMO_NEWS_COUNT);
        let mut dates: Vec<_> = news.iter().map(|n| n.date).collect();
        dates.dedup();
        assert_eq!(dates.len() as i64, DEMO_NEWS_COUNT);
    }
}
