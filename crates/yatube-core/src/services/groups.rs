use crate::domain::{Group, slugify};
use crate::error::DomainError;
use crate::forms::{GroupForm, non_blank};
use crate::pagination::{Page, Paginator};
use crate::ports::Repositories;

/// Slug used when a title has no ASCII letters or digits.
const FALLBACK_SLUG: &str = "group";

#[derive(Clone)]
pub struct GroupService {
    repos: Repositories,
    paginator: Paginator,
}

impl GroupService {
    pub fn new(repos: Repositories, paginator: Paginator) -> Self {
        Self { repos, paginator }
    }

    /// All groups ordered by title, paginated.
    pub async fn list(&self, page: Option<&str>) -> Result<Page<Group>, DomainError> {
        let groups = self.repos.groups.list_all().await?;
        Ok(self.paginator.paginate(groups, page))
    }

    /// Create a group. An explicit slug must be free; a derived one is
    /// suffixed with `-2`, `-3`, ... until it is.
    pub async fn create(&self, form: &GroupForm) -> Result<Group, DomainError> {
        let mut errors = form.validate();
        let explicit = non_blank(form.slug.as_deref()).map(str::to_string);
        if let Some(slug) = &explicit {
            if errors.get("slug").is_none() && self.slug_taken(slug).await? {
                errors.add("slug", "Group with this slug already exists.");
            }
        }
        errors.into_result()?;

        let slug = match explicit {
            Some(slug) => slug,
            None => self.free_slug(&form.title).await?,
        };
        let group = Group::new(
            form.title.trim().to_string(),
            slug,
            form.description.trim().to_string(),
        );
        let saved = self.repos.groups.save(group).await?;
        tracing::info!(slug = %saved.slug, "Group created");
        Ok(saved)
    }

    async fn slug_taken(&self, slug: &str) -> Result<bool, DomainError> {
        Ok(self.repos.groups.find_by_slug(slug).await?.is_some())
    }

    async fn free_slug(&self, title: &str) -> Result<String, DomainError> {
        let base = match slugify(title) {
            s if s.is_empty() => FALLBACK_SLUG.to_string(),
            s => s,
        };
        if !self.slug_taken(&base).await? {
            return Ok(base);
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.slug_taken(&candidate).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}
