//! In-memory [`RecordStore`].
//!
//! Backs `STORE_BACKEND=memory` and the test suites. Every table lives in one
//! `BTreeMap` behind a single mutex, and the store raises the same
//! [`StoreError`] variants Postgres would for unique and foreign-key
//! violations. Each call yields to the scheduler before touching the tables
//! so that concurrent callers interleave between calls, as they do against a
//! networked database.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use promptshelf_core::filters::contains_ignore_case;
use promptshelf_core::types::{DbId, SortOrder, Timestamp};

use crate::error::{StoreError, StoreResult};
use crate::models::prompt::{CreatePrompt, Prompt, PromptQuery, UpdatePrompt};
use crate::models::result::{CreateResult, PromptResult, ResultQuery};
use crate::models::shared_link::SharedLink;
use crate::models::tag::{Tag, TagCount};
use crate::models::user::{NewUser, User};
use crate::store::RecordStore;

#[derive(Default)]
struct Tables {
    last_id: DbId,
    users: BTreeMap<DbId, User>,
    prompts: BTreeMap<DbId, Prompt>,
    results: BTreeMap<DbId, PromptResult>,
    tags: BTreeMap<DbId, Tag>,
    /// Keyed by `(prompt_id, tag_id)`.
    prompt_tags: BTreeMap<(DbId, DbId), Timestamp>,
    shared_links: BTreeMap<String, SharedLink>,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    fn owner_of_prompt(&self, prompt_id: DbId) -> Option<DbId> {
        self.prompts.get(&prompt_id).map(|p| p.user_id)
    }

    fn require_user(&self, id: DbId, constraint: &str) -> StoreResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKeyViolation(constraint.to_string()))
        }
    }

    fn require_prompt(&self, id: DbId, constraint: &str) -> StoreResult<()> {
        if self.prompts.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKeyViolation(constraint.to_string()))
        }
    }
}

/// Sort by `(created_at, id)` in the requested direction.
fn sort_created<T>(items: &mut [T], order: SortOrder, key: impl Fn(&T) -> (Timestamp, DbId)) {
    items.sort_by_key(&key);
    if order == SortOrder::Desc {
        items.reverse();
    }
}

fn non_blank(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn yield_point() {
    tokio::task::yield_now().await;
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    // --- users ---

    async fn create_user(&self, input: &NewUser) -> StoreResult<User> {
        yield_point().await;
        let mut t = self.tables();
        if t.users.values().any(|u| u.email == input.email) {
            return Err(StoreError::UniqueViolation("uq_users_email".into()));
        }
        let now = Utc::now();
        let user = User {
            id: t.next_id(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        yield_point().await;
        Ok(self.tables().users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: DbId) -> StoreResult<Option<User>> {
        yield_point().await;
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn update_user_password(&self, id: DbId, password_hash: &str) -> StoreResult<bool> {
        yield_point().await;
        let mut t = self.tables();
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(false);
        };
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(true)
    }

    // --- prompts ---

    async fn create_prompt(&self, input: &CreatePrompt) -> StoreResult<Prompt> {
        yield_point().await;
        let mut t = self.tables();
        t.require_user(input.user_id, "prompts_user_id_fkey")?;
        let now = Utc::now();
        let prompt = Prompt {
            id: t.next_id(),
            user_id: input.user_id,
            title: input.title.clone(),
            content: input.content.clone(),
            created_at: now,
            updated_at: now,
        };
        t.prompts.insert(prompt.id, prompt.clone());
        Ok(prompt)
    }

    async fn find_prompt(&self, id: DbId) -> StoreResult<Option<Prompt>> {
        yield_point().await;
        Ok(self.tables().prompts.get(&id).cloned())
    }

    async fn list_prompts(&self, owner: DbId, query: &PromptQuery) -> StoreResult<Vec<Prompt>> {
        yield_point().await;
        let t = self.tables();
        let search = non_blank(query.search.as_deref());
        let mut prompts: Vec<Prompt> = t
            .prompts
            .values()
            .filter(|p| p.user_id == owner)
            .filter(|p| {
                query
                    .tag_id
                    .map_or(true, |tag_id| t.prompt_tags.contains_key(&(p.id, tag_id)))
            })
            .filter(|p| {
                search.map_or(true, |s| {
                    contains_ignore_case(&p.content, s)
                        || p.title.as_deref().is_some_and(|title| contains_ignore_case(title, s))
                })
            })
            .cloned()
            .collect();
        sort_created(&mut prompts, query.order, |p| (p.created_at, p.id));
        Ok(prompts)
    }

    async fn update_prompt(&self, id: DbId, input: &UpdatePrompt) -> StoreResult<Option<Prompt>> {
        yield_point().await;
        let mut t = self.tables();
        let Some(prompt) = t.prompts.get_mut(&id) else {
            return Ok(None);
        };
        prompt.title = input.title.clone();
        prompt.content = input.content.clone();
        prompt.updated_at = Utc::now();
        Ok(Some(prompt.clone()))
    }

    async fn delete_prompt(&self, id: DbId) -> StoreResult<bool> {
        yield_point().await;
        let mut t = self.tables();
        if t.prompts.remove(&id).is_none() {
            return Ok(false);
        }
        t.results.retain(|_, r| r.prompt_id != id);
        t.prompt_tags.retain(|(prompt_id, _), _| *prompt_id != id);
        t.shared_links.retain(|_, l| l.prompt_id != id);
        Ok(true)
    }

    // --- results ---

    async fn create_result(&self, input: &CreateResult) -> StoreResult<PromptResult> {
        yield_point().await;
        let mut t = self.tables();
        t.require_prompt(input.prompt_id, "results_prompt_id_fkey")?;
        let result = PromptResult {
            id: t.next_id(),
            prompt_id: input.prompt_id,
            kind: input.kind,
            content: input.content.clone(),
            file_path: input.file_path.clone(),
            size: input.size,
            created_at: Utc::now(),
        };
        t.results.insert(result.id, result.clone());
        Ok(result)
    }

    async fn find_result(&self, id: DbId) -> StoreResult<Option<PromptResult>> {
        yield_point().await;
        Ok(self.tables().results.get(&id).cloned())
    }

    async fn list_results_for_prompt(
        &self,
        prompt_id: DbId,
        order: SortOrder,
    ) -> StoreResult<Vec<PromptResult>> {
        yield_point().await;
        let mut results: Vec<PromptResult> = self
            .tables()
            .results
            .values()
            .filter(|r| r.prompt_id == prompt_id)
            .cloned()
            .collect();
        sort_created(&mut results, order, |r| (r.created_at, r.id));
        Ok(results)
    }

    async fn list_results_for_owner(
        &self,
        owner: DbId,
        query: &ResultQuery,
    ) -> StoreResult<Vec<PromptResult>> {
        yield_point().await;
        let t = self.tables();
        let search = non_blank(query.search.as_deref());
        let mut results: Vec<PromptResult> = t
            .results
            .values()
            .filter(|r| t.owner_of_prompt(r.prompt_id) == Some(owner))
            .filter(|r| {
                search.map_or(true, |s| {
                    r.file_path.as_deref().is_some_and(|path| contains_ignore_case(path, s))
                })
            })
            .filter(|r| query.from.map_or(true, |from| r.created_at >= from))
            .filter(|r| query.to.map_or(true, |to| r.created_at <= to))
            .filter(|r| query.kind.map_or(true, |kind| r.kind == kind))
            .cloned()
            .collect();
        sort_created(&mut results, query.order, |r| (r.created_at, r.id));
        Ok(results)
    }

    async fn find_results_for_owner(
        &self,
        owner: DbId,
        ids: &[DbId],
    ) -> StoreResult<Vec<PromptResult>> {
        yield_point().await;
        let t = self.tables();
        Ok(t.results
            .values()
            .filter(|r| ids.contains(&r.id))
            .filter(|r| t.owner_of_prompt(r.prompt_id) == Some(owner))
            .cloned()
            .collect())
    }

    async fn delete_result(&self, id: DbId) -> StoreResult<bool> {
        yield_point().await;
        Ok(self.tables().results.remove(&id).is_some())
    }

    async fn delete_results(&self, ids: &[DbId]) -> StoreResult<u64> {
        yield_point().await;
        let mut t = self.tables();
        let removed = ids.iter().filter(|id| t.results.remove(*id).is_some()).count();
        Ok(removed as u64)
    }

    // --- tags ---

    async fn find_tag_by_name(&self, owner: DbId, name: &str) -> StoreResult<Option<Tag>> {
        yield_point().await;
        Ok(self
            .tables()
            .tags
            .values()
            .find(|tag| tag.user_id == owner && tag.name == name)
            .cloned())
    }

    async fn insert_tag(&self, owner: DbId, name: &str) -> StoreResult<Tag> {
        yield_point().await;
        let mut t = self.tables();
        t.require_user(owner, "tags_user_id_fkey")?;
        if t.tags.values().any(|tag| tag.user_id == owner && tag.name == name) {
            return Err(StoreError::UniqueViolation("uq_tags_user_name".into()));
        }
        let tag = Tag {
            id: t.next_id(),
            user_id: owner,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        t.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn find_tag(&self, id: DbId) -> StoreResult<Option<Tag>> {
        yield_point().await;
        Ok(self.tables().tags.get(&id).cloned())
    }

    async fn list_tags(&self, owner: DbId) -> StoreResult<Vec<Tag>> {
        yield_point().await;
        let mut tags: Vec<Tag> = self
            .tables()
            .tags
            .values()
            .filter(|tag| tag.user_id == owner)
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(tags)
    }

    async fn delete_tag(&self, id: DbId) -> StoreResult<bool> {
        yield_point().await;
        let mut t = self.tables();
        if t.tags.remove(&id).is_none() {
            return Ok(false);
        }
        t.prompt_tags.retain(|(_, tag_id), _| *tag_id != id);
        Ok(true)
    }

    async fn insert_prompt_tag(&self, prompt_id: DbId, tag_id: DbId) -> StoreResult<bool> {
        yield_point().await;
        let mut t = self.tables();
        t.require_prompt(prompt_id, "prompt_tags_prompt_id_fkey")?;
        if !t.tags.contains_key(&tag_id) {
            return Err(StoreError::ForeignKeyViolation(
                "prompt_tags_tag_id_fkey".into(),
            ));
        }
        if t.prompt_tags.contains_key(&(prompt_id, tag_id)) {
            return Ok(false);
        }
        t.prompt_tags.insert((prompt_id, tag_id), Utc::now());
        Ok(true)
    }

    async fn delete_prompt_tag(&self, prompt_id: DbId, tag_id: DbId) -> StoreResult<bool> {
        yield_point().await;
        Ok(self.tables().prompt_tags.remove(&(prompt_id, tag_id)).is_some())
    }

    async fn list_tags_for_prompt(&self, prompt_id: DbId) -> StoreResult<Vec<Tag>> {
        yield_point().await;
        let t = self.tables();
        let mut tags: Vec<Tag> = t
            .prompt_tags
            .keys()
            .filter(|(p, _)| *p == prompt_id)
            .filter_map(|(_, tag_id)| t.tags.get(tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(tags)
    }

    async fn list_prompts_for_tag(&self, tag_id: DbId) -> StoreResult<Vec<Prompt>> {
        yield_point().await;
        let t = self.tables();
        let mut prompts: Vec<Prompt> = t
            .prompt_tags
            .keys()
            .filter(|(_, tag)| *tag == tag_id)
            .filter_map(|(prompt_id, _)| t.prompts.get(prompt_id).cloned())
            .collect();
        sort_created(&mut prompts, SortOrder::Desc, |p| (p.created_at, p.id));
        Ok(prompts)
    }

    async fn count_prompt_tags(&self, owner: DbId) -> StoreResult<Vec<TagCount>> {
        yield_point().await;
        let t = self.tables();
        let mut counts: BTreeMap<DbId, i64> = BTreeMap::new();
        for (_, tag_id) in t.prompt_tags.keys() {
            *counts.entry(*tag_id).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .filter_map(|(tag_id, count)| {
                let tag = t.tags.get(&tag_id).filter(|tag| tag.user_id == owner)?;
                Some(TagCount {
                    tag_id,
                    name: tag.name.clone(),
                    count,
                })
            })
            .collect())
    }

    // --- shared links ---

    async fn insert_shared_link(&self, slug: &str, prompt_id: DbId) -> StoreResult<SharedLink> {
        yield_point().await;
        let mut t = self.tables();
        t.require_prompt(prompt_id, "shared_links_prompt_id_fkey")?;
        if t.shared_links.contains_key(slug) {
            return Err(StoreError::UniqueViolation("shared_links_pkey".into()));
        }
        let link = SharedLink {
            slug: slug.to_string(),
            prompt_id,
            created_at: Utc::now(),
        };
        t.shared_links.insert(link.slug.clone(), link.clone());
        Ok(link)
    }

    async fn find_shared_link(&self, slug: &str) -> StoreResult<Option<SharedLink>> {
        yield_point().await;
        Ok(self.tables().shared_links.get(slug).cloned())
    }

    async fn list_shared_links(&self, prompt_id: DbId) -> StoreResult<Vec<SharedLink>> {
        yield_point().await;
        let mut links: Vec<SharedLink> = self
            .tables()
            .shared_links
            .values()
            .filter(|l| l.prompt_id == prompt_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn delete_shared_link(&self, slug: &str) -> StoreResult<bool> {
        yield_point().await;
        Ok(self.tables().shared_links.remove(slug).is_some())
    }
}
