// file: src/database/settings.rs
use anyhow::Result;
use sqlx::SqlitePool;

pub async fn get(pool: &SqlitePool) -> Result<crate::models::Settings> {
    let rows = sqlx::query_as::<_, (String, String)>("SELECT key, value FROM settings")
        .fetch_all(pool)
        .await?;

    let mut settings = crate::models::Settings::default();
    for (key, value) in rows {
        if key.as_str() == "disable_others" {
            settings.disable_others = value.parse().unwrap_or(true);
        }
    }

    Ok(settings)
}

pub async fn update(pool: &SqlitePool, settings: &crate::models::Settings) -> Result<()> {
    let disable_others = settings.disable_others.to_string();
    let updates = vec![("disable_others", disable_others.as_str())];

    for (key, value) in updates {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::models::Settings;

    #[tokio::test]
    async fn test_defaults_when_absent() {
        let pool = test_pool().await;
        let settings = get(&pool).await.unwrap();
        assert!(settings.disable_others);
    }

    #[tokio::test]
    async fn test_update_round_trip() {
        let pool = test_pool().await;
        update(&pool, &Settings { disable_others: false }).await.unwrap();
        assert!(!get(&pool).await.unwrap().disable_others);
        update(&pool, &Settings { disable_others: true }).await.unwrap();
        assert!(get(&pool).await.unwrap().disable_others);
    }

    #[tokio::test]
    async fn test_garbage_value_falls_back_to_default() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO settings (key, value) VALUES ('disable_others', 'maybe')")
            .execute(&pool)
            .await
            .unwrap();
        assert!(get(&pool).await.unwrap().disable_others);
    }
}
