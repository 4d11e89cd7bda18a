// Module database - PostgreSQL connection pool and saved route persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions, types::Json};

use crate::models::{SaveRouteRequest, SavedRoute, TravelMode, Waypoint};
use crate::store::{RouteStore, StoreError, validate};

/// Row layout of `saved_routes`
#[derive(Debug, FromRow)]
struct SavedRouteRow {
    id: i64,
    points: Json<Vec<Waypoint>>,
    travel_mode: String,
    total_time_s: f64,
    total_distance_m: f64,
    created_at: DateTime<Utc>,
}

impl TryFrom<SavedRouteRow> for SavedRoute {
    type Error = StoreError;

    fn try_from(row: SavedRouteRow) -> Result<Self, Self::Error> {
        let travel_mode = row
            .travel_mode
            .parse::<TravelMode>()
            .map_err(|err| StoreError::InvalidData(err.to_string()))?;
        Ok(SavedRoute {
            id: row.id,
            points: row.points.0,
            travel_mode,
            total_time: row.total_time_s,
            total_distance: row.total_distance_m,
            created_at: row.created_at,
        })
    }
}

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create new database connection pool
    ///
    /// # Errors
    /// Returns StoreError if the connection fails
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool created");

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        // raw_sql accepts several statements, query() does not
        let mut conn = self.pool.acquire().await?;

        let migration_sql = include_str!("../migrations/20260101_create_saved_routes.sql");

        sqlx::raw_sql(migration_sql).execute(&mut *conn).await?;

        tracing::info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl RouteStore for Database {
    async fn save_route(&self, req: SaveRouteRequest) -> Result<SavedRoute, StoreError> {
        validate(&req)?;

        let row = sqlx::query_as::<_, SavedRouteRow>(
            r#"
            INSERT INTO saved_routes (points, travel_mode, total_time_s, total_distance_m)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Json(&req.points))
        .bind(req.travel_mode.as_str())
        .bind(req.total_time)
        .bind(req.total_distance)
        .fetch_one(&self.pool)
        .await?;

        let route = SavedRoute::try_from(row)?;
        tracing::info!(
            "Route saved: {} points, {} (ID: {})",
            route.points.len(),
            route.travel_mode,
            route.id
        );
        Ok(route)
    }

    async fn get_route(&self, id: i64) -> Result<SavedRoute, StoreError> {
        let row = sqlx::query_as::<_, SavedRouteRow>("SELECT * FROM saved_routes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        SavedRoute::try_from(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Database, Container) - keep container alive to prevent Docker cleanup
    async fn setup_test_db() -> (
        Database,
        testcontainers::ContainerAsync<testcontainers_modules::postgres::Postgres>,
    ) {
        use testcontainers::{ImageExt, runners::AsyncRunner};
        use testcontainers_modules::postgres::Postgres;

        let container = Postgres::default()
            .with_tag("17-alpine")
            .start()
            .await
            .expect("Failed to start PostgreSQL container");

        let host = container.get_host().await.expect("Failed to get host");
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .expect("Failed to get port");
        let database_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test DB");
        db.migrate().await.expect("Failed to run migrations");

        (db, container)
    }

    fn create_test_route_request() -> SaveRouteRequest {
        SaveRouteRequest {
            points: vec![
                Waypoint::new("Kyiv, Ukraine", 50.4501, 30.5234),
                Waypoint::new("Zhytomyr, Ukraine", 50.2547, 28.6587),
                Waypoint::new("Rivne, Ukraine", 50.6199, 26.2516),
            ],
            travel_mode: TravelMode::Driving,
            total_time: 18_000.0,
            total_distance: 327_450.0,
        }
    }

    #[test]
    fn row_with_unknown_travel_mode_is_invalid() {
        let row = SavedRouteRow {
            id: 1,
            points: Json(Vec::new()),
            travel_mode: "FLYING".into(),
            total_time_s: 0.0,
            total_distance_m: 0.0,
            created_at: Utc::now(),
        };
        assert!(matches!(
            SavedRoute::try_from(row),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_save_and_retrieve_route() {
        let (db, _container) = setup_test_db().await;

        let saved = db
            .save_route(create_test_route_request())
            .await
            .expect("Failed to save route");
        assert!(saved.id > 0);

        let retrieved = db.get_route(saved.id).await.expect("Failed to get route");
        assert_eq!(retrieved.points.len(), 3);
        assert_eq!(retrieved.points[1].address, "Zhytomyr, Ukraine");
        assert_eq!(retrieved.travel_mode, TravelMode::Driving);
        assert_eq!(retrieved.total_distance, 327_450.0);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_get_nonexistent_route() {
        let (db, _container) = setup_test_db().await;

        let result = db.get_route(12345).await;
        assert!(matches!(result, Err(StoreError::NotFound(12345))));
    }
}
