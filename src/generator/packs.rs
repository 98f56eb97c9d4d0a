use serde::Deserialize;

const PACKS_JSON: &str = include_str!("../../assets/packs.json");

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Pack {
    pub id: String,
    pub title: String,
    pub description: String,
    pub texts: Vec<String>,
}

pub struct PackLibrary {
    packs: Vec<Pack>,
}

impl PackLibrary {
    pub fn load() -> Self {
        let packs: Vec<Pack> = serde_json::from_str(PACKS_JSON).unwrap_or_default();
        // A pack with nothing to type is useless to every mode
        let packs = packs.into_iter().filter(|p| !p.texts.is_empty()).collect();
        Self { packs }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.packs.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn find(&self, id: &str) -> Option<&Pack> {
        self.packs.iter().find(|p| p.id == id)
    }

    /// The pack with `id`, or the first pack when `id` is unknown.
    pub fn find_or_first(&self, id: &str) -> Option<&Pack> {
        self.find(id).or_else(|| self.packs.first())
    }

    pub fn all_texts(&self) -> Vec<String> {
        self.packs.iter().flat_map(|p| p.texts.iter().cloned()).collect()
    }
}
