use crate::model::{Bootcamp, Course, Review, User};
use crate::runtime::TargetRuntime;
use crate::store::Collection;
use crate::uid_gen::UidGenerator;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// On-disk form of the whole store, written back as one JSON document
/// after every mutation.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub bootcamps: Vec<Bootcamp>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub users: Vec<User>,
}

/// Document store backing the API. Mutations go through the save/delete
/// methods below so the derived aggregates on the parent bootcamp stay
/// correct and the snapshot is persisted.
pub struct DataStore {
    pub bootcamps: Collection<Bootcamp>,
    pub courses: Collection<Course>,
    pub reviews: Collection<Review>,
    pub users: Collection<User>,
    runtime: TargetRuntime,
    db_path: String,
    uid: Mutex<UidGenerator>,
}

impl DataStore {
    pub async fn init(runtime: TargetRuntime, db_path: String) -> Result<Self> {
        let snapshot = Self::fetch_snapshot(&db_path, &runtime)
            .await
            .unwrap_or_default();
        let store = Self {
            bootcamps: Collection::default(),
            courses: Collection::default(),
            reviews: Collection::default(),
            users: Collection::default(),
            runtime,
            db_path,
            uid: Mutex::new(UidGenerator::new()),
        };
        store.bootcamps.load(snapshot.bootcamps);
        store.courses.load(snapshot.courses);
        store.reviews.load(snapshot.reviews);
        store.users.load(snapshot.users);
        Ok(store)
    }

    async fn fetch_snapshot(path: &str, runtime: &TargetRuntime) -> Result<Snapshot> {
        if path.starts_with("http") {
            let url = url::Url::parse(path)?;
            let req = reqwest::Request::new(reqwest::Method::GET, url);
            let resp = runtime.http.execute(req).await?;
            Ok(serde_json::from_slice(&resp.body)?)
        } else {
            let body = runtime.file.read(path).await?;
            Ok(serde_json::from_str(&body)?)
        }
    }

    pub async fn persist(&self) -> Result<()> {
        // An http db_path is a read-only bootstrap source.
        if self.db_path.starts_with("http") {
            log::debug!("skipping persist, store was bootstrapped from {}", self.db_path);
            return Ok(());
        }
        let snapshot = Snapshot {
            bootcamps: self.bootcamps.all(),
            courses: self.courses.all(),
            reviews: self.reviews.all(),
            users: self.users.all(),
        };
        let body = serde_json::to_string(&snapshot)?;
        self.runtime.file.write(&self.db_path, body.as_bytes()).await
    }

    pub fn now(&self) -> Result<u128> {
        self.runtime.instance.now()
    }

    pub fn next_id(&self) -> Result<String> {
        let now = self.now()?;
        let mut uid = self
            .uid
            .lock()
            .map_err(|_| anyhow::anyhow!("uid generator poisoned"))?;
        Ok(uid.generate(now))
    }

    pub async fn save_bootcamp(&self, bootcamp: Bootcamp) -> Result<()> {
        self.bootcamps.insert(bootcamp);
        self.persist().await
    }

    /// Removes the bootcamp along with its courses and reviews.
    pub async fn delete_bootcamp(&self, id: &str) -> Result<Option<Bootcamp>> {
        let removed = self.bootcamps.remove(id);
        if removed.is_some() {
            for course in self.courses.find(|course| course.bootcamp == id) {
                self.courses.remove(&course.id);
            }
            for review in self.reviews.find(|review| review.bootcamp == id) {
                self.reviews.remove(&review.id);
            }
            self.persist().await?;
        }
        Ok(removed)
    }

    pub async fn save_course(&self, course: Course) -> Result<()> {
        let bootcamp_id = course.bootcamp.clone();
        self.courses.insert(course);
        self.recompute_average_cost(&bootcamp_id);
        self.persist().await
    }

    pub async fn delete_course(&self, id: &str) -> Result<Option<Course>> {
        let removed = self.courses.remove(id);
        if let Some(course) = removed.as_ref() {
            self.recompute_average_cost(&course.bootcamp);
            self.persist().await?;
        }
        Ok(removed)
    }

    pub async fn save_review(&self, review: Review) -> Result<()> {
        let bootcamp_id = review.bootcamp.clone();
        self.reviews.insert(review);
        self.recompute_average_rating(&bootcamp_id);
        self.persist().await
    }

    pub async fn delete_review(&self, id: &str) -> Result<Option<Review>> {
        let removed = self.reviews.remove(id);
        if let Some(review) = removed.as_ref() {
            self.recompute_average_rating(&review.bootcamp);
            self.persist().await?;
        }
        Ok(removed)
    }

    pub async fn save_user(&self, user: User) -> Result<()> {
        self.users.insert(user);
        self.persist().await
    }

    pub async fn delete_user(&self, id: &str) -> Result<Option<User>> {
        let removed = self.users.remove(id);
        if removed.is_some() {
            self.persist().await?;
        }
        Ok(removed)
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.users.find(|user| user.email == email).into_iter().next()
    }

    /// Grouped mean of course tuition, rounded up to the nearest ten,
    /// written back onto the bootcamp. Cleared when the last course goes.
    fn recompute_average_cost(&self, bootcamp_id: &str) {
        let Some(mut bootcamp) = self.bootcamps.get(bootcamp_id) else {
            return;
        };
        let tuitions: Vec<f64> = self
            .courses
            .find(|course| course.bootcamp == bootcamp_id)
            .iter()
            .map(|course| course.tuition)
            .collect();
        bootcamp.average_cost = if tuitions.is_empty() {
            None
        } else {
            let mean = tuitions.iter().sum::<f64>() / tuitions.len() as f64;
            Some((mean / 10.0).ceil() * 10.0)
        };
        self.bootcamps.insert(bootcamp);
    }

    /// Grouped mean of review ratings, written back onto the bootcamp.
    fn recompute_average_rating(&self, bootcamp_id: &str) {
        let Some(mut bootcamp) = self.bootcamps.get(bootcamp_id) else {
            return;
        };
        let ratings: Vec<f64> = self
            .reviews
            .find(|review| review.bootcamp == bootcamp_id)
            .iter()
            .map(|review| review.rating)
            .collect();
        bootcamp.average_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };
        self.bootcamps.insert(bootcamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MinimumSkill;

    async fn store() -> DataStore {
        let runtime = crate::runtime::tests::init();
        let store = DataStore::init(runtime, "test.db".to_string())
            .await
            .unwrap();
        store
            .save_bootcamp(Bootcamp {
                id: "b1".to_string(),
                name: "Devworks".to_string(),
                slug: "devworks".to_string(),
                description: "d".to_string(),
                address: "a".to_string(),
                user: "u1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        store
    }

    fn course(id: &str, tuition: f64) -> Course {
        Course {
            id: id.to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            weeks: 8,
            tuition,
            minimum_skill: MinimumSkill::Beginner,
            bootcamp: "b1".to_string(),
            user: "u1".to_string(),
            ..Default::default()
        }
    }

    fn review(id: &str, rating: f64) -> Review {
        Review {
            id: id.to_string(),
            title: "t".to_string(),
            text: "x".to_string(),
            rating,
            bootcamp: "b1".to_string(),
            user: "u1".to_string(),
            created_at: 0,
        }
    }

    #[tokio::test]
    async fn test_average_cost_rounds_up_to_tens() {
        let store = store().await;
        store.save_course(course("c1", 8001.0)).await.unwrap();
        store.save_course(course("c2", 4000.0)).await.unwrap();
        // mean 6000.5 -> ceil to 6010
        let bootcamp = store.bootcamps.get("b1").unwrap();
        assert_eq!(bootcamp.average_cost, Some(6010.0));
    }

    #[tokio::test]
    async fn test_average_cost_cleared_with_last_course() {
        let store = store().await;
        store.save_course(course("c1", 8000.0)).await.unwrap();
        assert!(store.bootcamps.get("b1").unwrap().average_cost.is_some());
        store.delete_course("c1").await.unwrap();
        assert_eq!(store.bootcamps.get("b1").unwrap().average_cost, None);
    }

    #[tokio::test]
    async fn test_average_rating_follows_reviews() {
        let store = store().await;
        store.save_review(review("r1", 10.0)).await.unwrap();
        store.save_review(review("r2", 7.0)).await.unwrap();
        assert_eq!(store.bootcamps.get("b1").unwrap().average_rating, Some(8.5));
        store.delete_review("r1").await.unwrap();
        assert_eq!(store.bootcamps.get("b1").unwrap().average_rating, Some(7.0));
    }

    #[tokio::test]
    async fn test_delete_bootcamp_cascades() {
        let store = store().await;
        store.save_course(course("c1", 8000.0)).await.unwrap();
        store.save_review(review("r1", 9.0)).await.unwrap();
        store.delete_bootcamp("b1").await.unwrap();
        assert!(store.courses.is_empty());
        assert!(store.reviews.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let runtime = crate::runtime::tests::init();
        {
            let store = DataStore::init(runtime.clone(), "snap.db".to_string())
                .await
                .unwrap();
            store
                .save_bootcamp(Bootcamp {
                    id: "b1".to_string(),
                    name: "Devworks".to_string(),
                    user: "u1".to_string(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        let reloaded = DataStore::init(runtime, "snap.db".to_string())
            .await
            .unwrap();
        assert_eq!(reloaded.bootcamps.get("b1").unwrap().name, "Devworks");
    }

    #[tokio::test]
    async fn test_next_id_unique() {
        let store = store().await;
        assert_ne!(store.next_id().unwrap(), store.next_id().unwrap());
    }

    // The server shares one store across spawned connection tasks.
    #[test]
    fn test_store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DataStore>();
    }
}
