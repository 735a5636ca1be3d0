use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryError {
    SelfParent { id: i32 },
    UnknownParent { parent_id: i32 },
    Cycle { id: i32, parent_id: i32 },
    DuplicateSlug { slug: String },
}

impl fmt::Display for CategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfParent { id } => write!(f, "category {id} cannot be its own parent"),
            Self::UnknownParent { parent_id } => {
                write!(f, "parent category {parent_id} does not exist")
            }
            Self::Cycle { id, parent_id } => write!(
                f,
                "moving category {id} under {parent_id} would create a cycle"
            ),
            Self::DuplicateSlug { slug } => write!(f, "category slug {slug:?} is already taken"),
        }
    }
}

impl std::error::Error for CategoryError {}

/// Parent links of every category, keyed by id.
///
/// Categories reference their parent by id only, so the tree can be checked without building
/// an object graph.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    parents: HashMap<i32, Option<i32>>,
}

impl CategoryTree {
    pub fn from_links(links: impl IntoIterator<Item = (i32, Option<i32>)>) -> Self {
        Self {
            parents: links.into_iter().collect(),
        }
    }

    pub fn contains(&self, id: i32) -> bool {
        self.parents.contains_key(&id)
    }

    /// Ancestors of `id`, nearest first. Stops early if the stored links already cycle.
    pub fn ancestors(&self, id: i32) -> Vec<i32> {
        let mut out = Vec::new();
        let mut cur = self.parents.get(&id).copied().flatten();
        while let Some(p) = cur {
            if p == id || out.contains(&p) {
                break;
            }
            out.push(p);
            cur = self.parents.get(&p).copied().flatten();
        }
        out
    }

    /// Validates giving `id` (or a new category when `None`) the parent `new_parent`.
    pub fn check_parent(&self, id: Option<i32>, new_parent: Option<i32>) -> Result<(), CategoryError> {
        let Some(parent_id) = new_parent else {
            return Ok(());
        };

        if id == Some(parent_id) {
            return Err(CategoryError::SelfParent { id: parent_id });
        }
        if !self.contains(parent_id) {
            return Err(CategoryError::UnknownParent { parent_id });
        }

        if let Some(id) = id {
            if self.ancestors(parent_id).contains(&id) {
                return Err(CategoryError::Cycle { id, parent_id });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 ─ 2 ─ 3
    //  └─ 4
    fn tree() -> CategoryTree {
        CategoryTree::from_links([(1, None), (2, Some(1)), (3, Some(2)), (4, Some(1))])
    }

    #[test]
    fn ancestors_nearest_first() {
        assert_eq!(tree().ancestors(3), vec![2, 1]);
        assert!(tree().ancestors(1).is_empty());
    }

    #[test]
    fn accepts_valid_moves_and_roots() {
        let t = tree();
        assert_eq!(t.check_parent(Some(4), Some(3)), Ok(()));
        assert_eq!(t.check_parent(Some(3), None), Ok(()));
        assert_eq!(t.check_parent(None, Some(2)), Ok(()));
    }

    #[test]
    fn rejects_self_unknown_and_cycles() {
        let t = tree();
        assert_eq!(
            t.check_parent(Some(2), Some(2)),
            Err(CategoryError::SelfParent { id: 2 })
        );
        assert_eq!(
            t.check_parent(None, Some(99)),
            Err(CategoryError::UnknownParent { parent_id: 99 })
        );
        assert_eq!(
            t.check_parent(Some(1), Some(3)),
            Err(CategoryError::Cycle { id: 1, parent_id: 3 })
        );
    }

    #[test]
    fn ancestors_terminate_on_corrupt_links() {
        let t = CategoryTree::from_links([(1, Some(2)), (2, Some(1))]);
        assert_eq!(t.ancestors(1), vec![2]);
    }
}
