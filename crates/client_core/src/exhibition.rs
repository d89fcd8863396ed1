use anyhow::{bail, Context, Result};
use shared::{
    domain::{Material, MaterialId, Partner, PartnerId, User},
    links::format_link,
    protocol::{MaterialDraft, PartnerUpdate},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    media::{resolve_media, MediaKind, MediaSource},
    state::EventSession,
};

pub const ADMIN_PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerTier {
    Main,
    Premium,
    Basic,
}

impl PartnerTier {
    /// Priorities below 10 are main partners, 10 through 99 premium; no
    /// priority or anything above 99 is a regular partner.
    pub fn for_priority(priority: Option<i64>) -> Self {
        match priority {
            None | Some(0) => PartnerTier::Basic,
            Some(p) if p < 10 => PartnerTier::Main,
            Some(p) if p <= 99 => PartnerTier::Premium,
            Some(_) => PartnerTier::Basic,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PartnerTier::Main => "Main partners",
            PartnerTier::Premium => "Premium partners",
            PartnerTier::Basic => "Partners",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PartnerSections {
    pub main: Vec<Partner>,
    pub premium: Vec<Partner>,
    pub basic: Vec<Partner>,
}

impl PartnerSections {
    pub fn from_partners(partners: Vec<Partner>) -> Self {
        let mut sections = Self::default();
        for partner in partners {
            match PartnerTier::for_priority(partner.priority) {
                PartnerTier::Main => sections.main.push(partner),
                PartnerTier::Premium => sections.premium.push(partner),
                PartnerTier::Basic => sections.basic.push(partner),
            }
        }
        sections
    }

    /// Non-empty sections in display order.
    pub fn sections(&self) -> Vec<(PartnerTier, &[Partner])> {
        [
            (PartnerTier::Main, self.main.as_slice()),
            (PartnerTier::Premium, self.premium.as_slice()),
            (PartnerTier::Basic, self.basic.as_slice()),
        ]
        .into_iter()
        .filter(|(_, partners)| !partners.is_empty())
        .collect()
    }
}

/// Partner admins shown on a partner card, plus how many did not fit.
#[derive(Debug, Clone)]
pub struct AdminPreview<'a> {
    pub shown: Vec<&'a User>,
    pub overflow: usize,
}

pub fn admin_preview(partner: &Partner) -> AdminPreview<'_> {
    let admins: Vec<&User> = partner.users.iter().filter(|u| u.partner_admin).collect();
    let overflow = admins.len().saturating_sub(ADMIN_PREVIEW_LIMIT);
    AdminPreview {
        shown: admins.into_iter().take(ADMIN_PREVIEW_LIMIT).collect(),
        overflow,
    }
}

/// Where opening a material leads. Embedded materials open in place.
pub fn material_target(material: &Material) -> Option<String> {
    if material.as_embed {
        return None;
    }
    material
        .url
        .clone()
        .filter(|url| !url.is_empty())
        .or_else(|| {
            material
                .link
                .as_deref()
                .filter(|link| !link.is_empty())
                .map(format_link)
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterialError {
    #[error("a material name is required")]
    MissingName,
    #[error("a thumbnail is required for new materials")]
    MissingThumbnail,
}

/// Input for creating or editing a partner material.
#[derive(Debug, Clone, Default)]
pub struct MaterialInput {
    pub existing: Option<MaterialId>,
    pub name: String,
    pub thumbnail: Option<MediaSource>,
    pub file: Option<MediaSource>,
    pub link: Option<String>,
    pub as_embed: Option<bool>,
}

impl MaterialInput {
    pub fn validate(&self) -> Result<(), MaterialError> {
        if self.name.trim().is_empty() {
            return Err(MaterialError::MissingName);
        }
        if self.existing.is_none() && self.thumbnail.is_none() {
            return Err(MaterialError::MissingThumbnail);
        }
        Ok(())
    }
}

impl EventSession {
    pub async fn partner_sections(&self) -> Result<PartnerSections> {
        let event = self.event().await?;
        let partners = self
            .api
            .partners(&event.id)
            .await
            .context("failed to load partners")?;
        Ok(PartnerSections::from_partners(partners))
    }

    /// Opens a partner booth and records the visit. A failed visit log is
    /// only warned about.
    pub async fn visit_booth(&self, partner_id: &PartnerId) -> Result<Partner> {
        let event = self.event().await?;
        let partner = self
            .api
            .partner(&event.id, partner_id)
            .await
            .with_context(|| format!("failed to load partner {partner_id}"))?;
        if let Err(err) = self.api.log_booth_visit(&event.id, &partner.id).await {
            warn!(partner_id = %partner.id, "failed to log booth visit: {err}");
        }
        Ok(partner)
    }

    /// The partner the signed-in user administers.
    pub async fn own_partner(&self) -> Result<Partner> {
        let (event, user) = self.context().await?;
        let Some(partner) = user.partner.as_ref().filter(|_| user.partner_admin) else {
            bail!("user {} is not a partner admin", user.id);
        };
        self.api
            .partner(&event.id, &partner.id)
            .await
            .with_context(|| format!("failed to load partner {}", partner.id))
    }

    pub async fn save_partner_profile(
        &self,
        mut update: PartnerUpdate,
        logo: Option<MediaSource>,
    ) -> Result<()> {
        let partner = self.own_partner().await?;
        if let Some(logo) = logo {
            update.logo = Some(resolve_media(self.media.as_ref(), MediaKind::Logo, &logo).await?);
        }
        self.api
            .update_partner(&partner.id, &update)
            .await
            .with_context(|| format!("failed to save partner {}", partner.id))?;
        info!(partner_id = %partner.id, "partner details saved");
        Ok(())
    }

    pub async fn save_material(&self, input: MaterialInput) -> Result<Partner> {
        input.validate()?;
        let partner = self.own_partner().await?;
        let event = self.event().await?;

        let thumbnail_url = match &input.thumbnail {
            Some(source) => {
                Some(resolve_media(self.media.as_ref(), MediaKind::Material, source).await?)
            }
            None => None,
        };
        let url = match &input.file {
            Some(source) => {
                Some(resolve_media(self.media.as_ref(), MediaKind::Material, source).await?)
            }
            None => None,
        };

        let draft = MaterialDraft {
            name: input.name.trim().to_string(),
            thumbnail_url,
            url,
            link: input.link.clone().filter(|link| !link.trim().is_empty()),
            as_embed: input.as_embed,
            partner: partner.id.clone(),
            event: event.id.clone(),
        };

        match &input.existing {
            Some(material_id) => self
                .api
                .update_material(material_id, &draft)
                .await
                .with_context(|| format!("failed to update material {material_id}"))?,
            None => self
                .api
                .create_material(&draft)
                .await
                .context("failed to create material")?,
        }
        info!(partner_id = %partner.id, name = %draft.name, "material saved");
        self.own_partner().await
    }

    pub async fn delete_material(&self, material_id: &MaterialId) -> Result<Partner> {
        self.api
            .delete_material(material_id)
            .await
            .with_context(|| format!("failed to delete material {material_id}"))?;
        self.own_partner().await
    }
}

#[cfg(test)]
#[path = "tests/exhibition_tests.rs"]
mod tests;
