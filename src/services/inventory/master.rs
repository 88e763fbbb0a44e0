use super::{
    CreateDefinitionRequest, InventoryService, IssueOptions, IssueRequest, MAX_ISSUE_AMOUNT, Outcome,
    SetDurabilityRequest, check_version, require_version, view,
};
use crate::db::repo::InstanceBatch;
use crate::engine::catalog::{effective_max_stack, has_durability, max_durability};
use crate::engine::permissions::LobbyContext;
use crate::engine::placement::{auto_place, footprint_in};
use crate::error::{AppResult, DomainError};
use crate::models::catalog::ItemDefinition;
use crate::models::container::ContainerId;
use crate::models::instance::ItemInstance;
use crate::models::types::{AccountId, DefinitionId, LobbyId};
use bytes::Bytes;
use rand::Rng;

impl InventoryService {
    /// Lobby context for a master-only action by `actor`.
    async fn require_master(&self, actor: AccountId, lobby_id: Option<LobbyId>) -> AppResult<LobbyContext> {
        let lobby_id = lobby_id.ok_or(DomainError::Forbidden)?;
        let ctx = self.lobby_context(lobby_id, actor, actor).await?;
        if !ctx.actor_is_master(actor) {
            tracing::debug!(%actor, lobby_id = %lobby_id, "master action refused");
            return Err(DomainError::Forbidden);
        }
        Ok(ctx)
    }

    /// Creates `amount` new instances of `def` for `recipient`, chunked by the stack limit.
    /// Either every chunk finds a place or nothing is created.
    async fn issue_definition(
        &self,
        ctx: &LobbyContext,
        recipient: AccountId,
        def: &ItemDefinition,
        options: &IssueOptions,
    ) -> AppResult<Vec<ItemInstance>> {
        if !self.is_member(ctx, recipient).await? {
            return Err(DomainError::InvalidRecipient);
        }

        let amount = options.amount.unwrap_or(1);
        if !(1..=MAX_ISSUE_AMOUNT).contains(&amount) {
            return Err(DomainError::InvalidAmount);
        }

        let inv = self.load_inventory(recipient).await?;
        let container = inv
            .container(ContainerId::Main)
            .ok_or_else(|| DomainError::InvalidContainer(ContainerId::Main.to_string()))?;
        let mut grid = inv.grid(&container, &[]);

        let max_stack = effective_max_stack(def);
        // ThreadRng is not Send; keep it out of scope before awaiting
        let created = {
            let mut rng = rand::rng();
            let mut created = Vec::new();
            let mut left = amount;

            while left > 0 {
                let chunk = left.min(max_stack);
                left -= chunk;

                let spot = auto_place(&container, &grid, def, false).ok_or(DomainError::NoSpace)?;
                let (w, h) = footprint_in(&container, def, spot.rotated);
                grid.occupy(spot.x, spot.y, w, h);

                let mut inst = ItemInstance::new(recipient, def, ContainerId::Main);
                inst.amount = chunk;
                inst.place(ContainerId::Main, spot.x, spot.y, spot.rotated);

                if has_durability(def) {
                    let max = max_durability(def).unwrap_or(1);
                    inst.durability_current = Some(match options.durability_current {
                        Some(v) => v.clamp(0, max),
                        None if options.random_durability.unwrap_or(false) => rng.random_range(1..=max),
                        None => max,
                    });
                }
                created.push(inst);
            }
            created
        };

        let mut batch = InstanceBatch::new();
        for inst in &created {
            batch.insert(inst.clone());
        }
        self.commit("issue", batch).await?;

        tracing::info!(definition_id = %def.id, %recipient, amount, instances = created.len(), "items issued");
        Ok(created)
    }

    fn issued_outcome(created: &[ItemInstance], def: &ItemDefinition) -> Outcome {
        let views: Vec<_> = created.iter().map(|i| view(i, def)).collect();
        Outcome {
            instance: views.first().cloned(),
            created: views,
            ..Outcome::default()
        }
    }

    pub async fn issue(&self, actor: AccountId, req: IssueRequest) -> AppResult<Outcome> {
        let ctx = self.require_master(actor, req.lobby_id).await?;
        let def = self.catalog.get_definition(req.template_id).await?;

        let created = self
            .issue_definition(&ctx, req.target_user_id, &def, &req.options)
            .await?;
        Ok(Self::issued_outcome(&created, &def))
    }

    pub async fn set_durability(&self, actor: AccountId, req: SetDurabilityRequest) -> AppResult<Outcome> {
        let expected = require_version(req.version)?;
        let inst = self.get_instance(req.item_id).await?;
        let (access, _) = self.authorize_edit(actor, inst.owner_id, req.lobby_id).await?;
        if !access.is_master {
            return Err(DomainError::Forbidden);
        }
        check_version(&inst, expected)?;

        let def = self.catalog.get_definition(inst.definition_id).await?;
        let max = max_durability(&def).ok_or(DomainError::InvalidItem("item has no durability"))?;
        let value = req.value.ok_or(DomainError::InvalidValue("value"))?;

        let mut next = inst.clone();
        next.durability_current = Some(value.clamp(0, max));

        let mut batch = InstanceBatch::new();
        let stored = batch.update(&next);
        self.commit("set_durability", batch).await?;

        tracing::info!(item_id = %stored.id, %actor, durability = ?stored.durability_current, "durability set");
        Ok(Outcome::of(view(&stored, &def)))
    }

    /// Creates a definition and optionally issues it straight away.
    pub async fn create_definition(&self, actor: AccountId, req: CreateDefinitionRequest) -> AppResult<Outcome> {
        let ctx = self.require_master(actor, req.lobby_id).await?;
        let def = self.catalog.create_definition(req.definition).await?;

        let mut outcome = match req.issue_to {
            Some(recipient) => {
                let options = IssueOptions {
                    amount: req.issue_amount,
                    durability_current: req.durability_current,
                    random_durability: req.random_durability,
                };
                let created = self.issue_definition(&ctx, recipient, &def, &options).await?;
                Self::issued_outcome(&created, &def)
            }
            None => Outcome::default(),
        };

        outcome.definition = Some(def);
        Ok(outcome)
    }

    /// Stores a new image for a definition and records its path.
    pub async fn replace_image(
        &self,
        actor: AccountId,
        lobby_id: Option<LobbyId>,
        definition_id: DefinitionId,
        content_type: Option<&str>,
        data: Bytes,
    ) -> AppResult<Outcome> {
        self.require_master(actor, lobby_id).await?;
        self.catalog.get_definition(definition_id).await?;

        let path = self.media.store(definition_id, content_type, data).await?;
        let def = self.catalog.set_image_path(definition_id, &path).await?;

        tracing::info!(%definition_id, path = %path, "definition image replaced");
        Ok(Outcome {
            definition: Some(def),
            ..Outcome::default()
        })
    }
}
