use crate::api_client::ApiClient;
use crate::collection::Collection;
use crate::errors::ClientError;
use crate::models::{Achievement, Education, Experience};

/// The three profile sub-resources, loaded and cleared together.
pub struct ProfileCollections {
    pub experiences: Collection<Experience>,
    pub educations: Collection<Education>,
    pub achievements: Collection<Achievement>,
}

impl ProfileCollections {
    pub fn new(client: ApiClient) -> Self {
        Self {
            experiences: Collection::new(client.clone()),
            educations: Collection::new(client.clone()),
            achievements: Collection::new(client),
        }
    }

    /// Loads all three lists concurrently.
    ///
    /// Each collection applies its own `load` contract, so one failing list
    /// does not prevent the others from refreshing. The first error is returned.
    pub async fn load_all(&self) -> Result<(), ClientError> {
        let (experiences, educations, achievements) = tokio::join!(
            self.experiences.load(),
            self.educations.load(),
            self.achievements.load(),
        );
        experiences?;
        educations?;
        achievements
    }

    pub fn clear(&self) {
        self.experiences.clear();
        self.educations.clear();
        self.achievements.clear();
    }

    pub fn is_loading(&self) -> bool {
        self.experiences.is_loading()
            || self.educations.is_loading()
            || self.achievements.is_loading()
    }
}
