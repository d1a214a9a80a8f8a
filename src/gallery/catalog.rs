use serde::{Deserialize, Serialize};

const PICSUM_BASE: &str = "https://picsum.photos";

/// Categories the gallery page can show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Desktop,
    Mobile,
    Abstract,
    Nature,
}

/// Shape of one category's image list on the remote catalog.
struct CategorySpec {
    count: usize,
    width: u32,
    height: u32,
    first_seed: usize,
    tag: &'static str,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Desktop,
        Category::Mobile,
        Category::Abstract,
        Category::Nature,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Desktop => "desktop",
            Category::Mobile => "mobile",
            Category::Abstract => "abstract",
            Category::Nature => "nature",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Desktop => "Desktop",
            Category::Mobile => "Mobile",
            Category::Abstract => "Abstract",
            Category::Nature => "Nature",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    fn spec(self) -> CategorySpec {
        match self {
            Category::Desktop => CategorySpec {
                count: 20,
                width: 1920,
                height: 1080,
                first_seed: 1,
                tag: "nature",
            },
            Category::Mobile => CategorySpec {
                count: 24,
                width: 400,
                height: 800,
                first_seed: 25,
                tag: "abstract",
            },
            Category::Abstract => CategorySpec {
                count: 18,
                width: 1200,
                height: 800,
                first_seed: 50,
                tag: "abstract",
            },
            Category::Nature => CategorySpec {
                count: 16,
                width: 1200,
                height: 800,
                first_seed: 70,
                tag: "nature",
            },
        }
    }

    /// Image URLs for this category, in display order.
    pub fn images(self) -> Vec<String> {
        let spec = self.spec();
        (0..spec.count)
            .map(|i| {
                format!(
                    "{}/{}/{}?random={}&category={}",
                    PICSUM_BASE,
                    spec.width,
                    spec.height,
                    spec.first_seed + i,
                    spec.tag
                )
            })
            .collect()
    }
}

/// Entry on the categories page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub count_label: &'static str,
}

impl CategoryInfo {
    /// The gallery category this entry opens, if the gallery carries it.
    pub fn gallery_category(&self) -> Option<Category> {
        Category::from_key(self.id)
    }
}

pub const CATEGORY_DIRECTORY: &[CategoryInfo] = &[
    CategoryInfo {
        id: "desktop",
        name: "Desktop",
        description: "High-resolution wallpapers perfect for your computer",
        count_label: "2.5K+",
    },
    CategoryInfo {
        id: "mobile",
        name: "Mobile",
        description: "Optimized wallpapers for smartphones and tablets",
        count_label: "3.2K+",
    },
    CategoryInfo {
        id: "abstract",
        name: "Abstract",
        description: "Artistic and creative abstract designs",
        count_label: "1.8K+",
    },
    CategoryInfo {
        id: "nature",
        name: "Nature",
        description: "Beautiful landscapes and natural scenery",
        count_label: "2.1K+",
    },
    CategoryInfo {
        id: "minimal",
        name: "Minimal",
        description: "Clean and simple designs for a clutter-free look",
        count_label: "1.5K+",
    },
    CategoryInfo {
        id: "artistic",
        name: "Artistic",
        description: "Creative artwork and digital art pieces",
        count_label: "1.9K+",
    },
];
