use anyhow::Result;

use foody_bot::db;

async fn test_pool() -> Result<sqlx::SqlitePool> {
    let pool = db::connect("sqlite::memory:").await?;
    db::init_schema(&pool).await?;
    Ok(pool)
}

#[tokio::test]
async fn test_link_roundtrip() -> Result<()> {
    let pool = test_pool().await?;

    assert_eq!(db::get_link(&pool, 100).await?, None);

    db::save_link(&pool, 100, 7, "Кафе Май").await?;
    let link = db::get_link(&pool, 100).await?.expect("link saved");
    assert_eq!(link.chat_id, 100);
    assert_eq!(link.restaurant_id, 7);
    assert_eq!(link.restaurant_name, "Кафе Май");

    Ok(())
}

#[tokio::test]
async fn test_save_link_overwrites_existing() -> Result<()> {
    let pool = test_pool().await?;

    db::save_link(&pool, 100, 7, "Старое имя").await?;
    db::save_link(&pool, 100, 9, "Новое имя").await?;

    let link = db::get_link(&pool, 100).await?.expect("link saved");
    assert_eq!(link.restaurant_id, 9);
    assert_eq!(link.restaurant_name, "Новое имя");

    Ok(())
}

#[tokio::test]
async fn test_links_are_per_chat() -> Result<()> {
    let pool = test_pool().await?;

    db::save_link(&pool, 1, 7, "Первый").await?;
    db::save_link(&pool, 2, 8, "Второй").await?;

    assert_eq!(db::get_link(&pool, 1).await?.unwrap().restaurant_id, 7);
    assert_eq!(db::get_link(&pool, 2).await?.unwrap().restaurant_id, 8);

    Ok(())
}

#[tokio::test]
async fn test_delete_link() -> Result<()> {
    let pool = test_pool().await?;

    db::save_link(&pool, 100, 7, "Кафе").await?;
    assert!(db::delete_link(&pool, 100).await?);
    assert!(!db::delete_link(&pool, 100).await?);
    assert_eq!(db::get_link(&pool, 100).await?, None);

    Ok(())
}
