use crate::access::errors::{AccessError, AccessResult};
use crate::bgv::Ciphertext;
use std::collections::HashMap;

pub type UserId = u32;

/// Encrypted enrollment templates, grouped per identity.
///
/// Built once by the template encoder and read-only afterwards; concurrent
/// queries share it freely. Every enrolled identity has at least one
/// template — an identity that was never enrolled (or would have an empty
/// list) is indistinguishable and both are rejected as unknown.
#[derive(Default)]
pub struct TemplateStore<const DEGREE: usize> {
    templates: HashMap<UserId, Vec<Ciphertext<DEGREE>>>,
}

impl<const DEGREE: usize> TemplateStore<DEGREE> {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, user: UserId, template: Ciphertext<DEGREE>) {
        self.templates.entry(user).or_default().push(template);
    }

    /// All templates of `user`; rejects identities with nothing enrolled.
    pub fn templates_for(&self, user: UserId) -> AccessResult<&[Ciphertext<DEGREE>]> {
        match self.templates.get(&user) {
            Some(list) if !list.is_empty() => Ok(list),
            _ => Err(AccessError::UnknownIdentity(user)),
        }
    }

    pub fn user_count(&self) -> usize {
        self.templates.len()
    }

    pub fn template_count(&self, user: UserId) -> usize {
        self.templates.get(&user).map_or(0, Vec::len)
    }
}
