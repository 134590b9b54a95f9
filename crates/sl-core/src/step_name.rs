//! Strongly-typed migration step name.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// Name under which a step action is registered and referenced from a
    /// migration definition.
    pub struct StepName;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_name_trims_whitespace() {
        let name = StepName::new("  create_groups ");
        assert_eq!(name.as_str(), "create_groups");
    }

    #[test]
    fn test_step_name_rejects_blank() {
        assert!(StepName::try_new("").is_none());
        assert!(StepName::try_new("   ").is_none());
    }

    #[test]
    fn test_step_name_borrow_lookup() {
        use std::collections::HashMap;
        let mut map: HashMap<StepName, i32> = HashMap::new();
        map.insert(StepName::new("undo_a"), 7);
        assert_eq!(map.get("undo_a"), Some(&7));
    }

    #[test]
    fn test_step_name_deserialize_rejects_blank() {
        let err = serde_yaml::from_str::<StepName>("\"  \"").unwrap_err();
        assert!(err.to_string().contains("must not be blank"));

        let ok: StepName = serde_yaml::from_str("add_index").unwrap();
        assert_eq!(ok, "add_index");
    }
}
