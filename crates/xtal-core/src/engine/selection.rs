use super::config::ConfigError;
use crate::core::models::structure::Structure;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Partition of chains into interacting molecules.
///
/// Each selection token is one group; commas inside a token join several
/// chains into the same molecule, so `["A,B", "C"]` treats A and B as a single
/// partner of C. Contacts are only counted between different groups.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionGroups {
    labels: Vec<String>,
    groups: Vec<Vec<String>>,
    chain_group: HashMap<String, usize>,
}

impl SelectionGroups {
    /// Builds the groups from explicit tokens, or one group per chain in
    /// structure order when no (or an empty) token list is given.
    pub fn resolve(structure: &Structure, selection: Option<&[String]>) -> Result<Self, ConfigError> {
        let groups = match selection {
            Some(tokens) if !tokens.is_empty() => Self::from_tokens(tokens)?,
            _ => return Ok(Self::one_per_chain(structure)),
        };

        for chain in groups.chain_group.keys() {
            if structure.find_chain_by_id(chain).is_none() {
                warn!(chain = %chain, "Selected chain is not present in the structure.");
            }
        }
        Ok(groups)
    }

    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, ConfigError> {
        let mut labels = Vec::with_capacity(tokens.len());
        let mut groups = Vec::with_capacity(tokens.len());
        let mut chain_group = HashMap::new();

        for (index, token) in tokens.iter().enumerate() {
            let token = token.as_ref();
            let chains: Vec<String> = token
                .split(',')
                .map(str::trim)
                .filter(|chain| !chain.is_empty())
                .map(str::to_string)
                .collect();
            if chains.is_empty() {
                return Err(ConfigError::EmptyGroup { index });
            }
            for chain in &chains {
                if chain_group.insert(chain.clone(), index).is_some() {
                    return Err(ConfigError::DuplicateChain {
                        chain: chain.clone(),
                    });
                }
            }
            labels.push(token.to_string());
            groups.push(chains);
        }

        Ok(Self {
            labels,
            groups,
            chain_group,
        })
    }

    pub fn one_per_chain(structure: &Structure) -> Self {
        let mut labels = Vec::new();
        let mut groups = Vec::new();
        let mut chain_group = HashMap::new();

        for (index, (_, chain)) in structure.chains_iter().enumerate() {
            labels.push(chain.id.clone());
            groups.push(vec![chain.id.clone()]);
            chain_group.insert(chain.id.clone(), index);
        }

        Self {
            labels,
            groups,
            chain_group,
        }
    }

    pub fn group_of(&self, chain: &str) -> Option<usize> {
        self.chain_group.get(chain).copied()
    }

    /// The selection tokens as given, used when reporting.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn groups(&self) -> &[Vec<String>] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn first_group_contains(&self, chain: &str) -> bool {
        self.group_of(chain) == Some(0)
    }

    /// Every chain mentioned by any group.
    pub fn chains(&self) -> HashSet<String> {
        self.chain_group.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structure_with_chains(ids: &[&str]) -> Structure {
        let mut structure = Structure::new("chains");
        for id in ids {
            structure.add_chain(id);
        }
        structure
    }

    #[test]
    fn default_is_one_group_per_chain_in_order() {
        let structure = structure_with_chains(&["E", "I", "A"]);
        let groups = SelectionGroups::resolve(&structure, None).unwrap();
        assert_eq!(groups.labels(), ["E", "I", "A"]);
        assert_eq!(groups.group_of("E"), Some(0));
        assert_eq!(groups.group_of("I"), Some(1));
        assert_eq!(groups.group_of("A"), Some(2));
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn empty_token_list_falls_back_to_default() {
        let structure = structure_with_chains(&["A", "B"]);
        let groups = SelectionGroups::resolve(&structure, Some(&[])).unwrap();
        assert_eq!(groups, SelectionGroups::one_per_chain(&structure));
    }

    #[test]
    fn comma_joins_chains_into_one_group() {
        let groups = SelectionGroups::from_tokens(&["A,B", "C"]).unwrap();
        assert_eq!(groups.group_of("A"), Some(0));
        assert_eq!(groups.group_of("B"), Some(0));
        assert_eq!(groups.group_of("C"), Some(1));
        assert_eq!(groups.group_of("D"), None);
        assert!(groups.first_group_contains("B"));
        assert!(!groups.first_group_contains("C"));
        assert_eq!(groups.labels(), ["A,B", "C"]);
        assert_eq!(groups.groups()[0], vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn overlapping_groups_name_the_repeated_chain() {
        let err = SelectionGroups::from_tokens(&["A,B", "B,C"]).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateChain { chain: "B".into() });
    }

    #[test]
    fn empty_chain_tokens_are_ignored() {
        let groups = SelectionGroups::from_tokens(&["A,,B", "C,"]).unwrap();
        assert_eq!(groups.chains().len(), 3);
        assert_eq!(groups.group_of("C"), Some(1));
    }

    #[test]
    fn group_without_chains_is_rejected() {
        let err = SelectionGroups::from_tokens(&["A", ","]).unwrap_err();
        assert_eq!(err, ConfigError::EmptyGroup { index: 1 });
    }

    #[test]
    fn unknown_chains_are_kept_in_the_map() {
        let structure = structure_with_chains(&["A"]);
        let tokens = vec!["A".to_string(), "Z".to_string()];
        let groups = SelectionGroups::resolve(&structure, Some(&tokens)).unwrap();
        assert_eq!(groups.group_of("Z"), Some(1));
    }
}
