//! Entry points used by the presentation layer.
//!
//! `System` owns the inventory, both actor directories and the committed
//! bills. Every mutation takes `&mut self` and either fully succeeds or leaves
//! the system untouched.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use stockroom_core::{ActorId, BillId, DomainError, DomainResult, MovementId};
use stockroom_infra::AppConfig;
use stockroom_inventory::{
    DEFAULT_MARKUP_PERCENT, Inventory, InventoryRecord, Location, Movement, Stock,
};
use stockroom_invoicing::{Bill, DraftBill, PaymentMethod, SalesSummary, summarize};
use stockroom_parties::{Actor, ActorDirectory, ActorRole};
use stockroom_products::{Product, ProductCode};

/// Tunables applied to new records and outbound pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub default_min_stock: i64,
    pub default_max_stock: i64,
    pub markup_percent: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_min_stock: 20,
            default_max_stock: 200,
            markup_percent: DEFAULT_MARKUP_PERCENT,
        }
    }
}

impl From<&AppConfig> for Settings {
    fn from(config: &AppConfig) -> Self {
        Self {
            default_min_stock: config.default_min_stock,
            default_max_stock: config.default_max_stock,
            markup_percent: config.markup_percent,
        }
    }
}

/// First entry of a product, delivered by a supplier.
#[derive(Debug, Clone)]
pub struct EntryRecord {
    pub product: Product,
    pub quantity: i64,
    pub supplier_id: ActorId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RecordSale {
    pub code: ProductCode,
    pub customer_id: ActorId,
    pub quantity: i64,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Restock {
    pub code: ProductCode,
    pub supplier_id: ActorId,
    pub quantity: i64,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Bill the listed movements of one customer or supplier.
#[derive(Debug, Clone)]
pub struct CreateBill {
    pub entity_id: ActorId,
    pub movement_ids: Vec<MovementId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct System {
    pub(crate) inventory: Inventory,
    pub(crate) customers: ActorDirectory,
    pub(crate) suppliers: ActorDirectory,
    pub(crate) bills: Vec<Bill>,
    settings: Settings,
}

impl Default for System {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl System {
    pub fn new(settings: Settings) -> Self {
        Self {
            inventory: Inventory::new(),
            customers: ActorDirectory::new(ActorRole::Customer),
            suppliers: ActorDirectory::new(ActorRole::Supplier),
            bills: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn customers(&self) -> &ActorDirectory {
        &self.customers
    }

    pub fn suppliers(&self) -> &ActorDirectory {
        &self.suppliers
    }

    /// Committed bills in creation (or import) order.
    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn bill(&self, id: BillId) -> Option<&Bill> {
        self.bills.iter().find(|b| b.id_typed() == id)
    }

    pub(crate) fn directory(&self, role: ActorRole) -> &ActorDirectory {
        match role {
            ActorRole::Customer => &self.customers,
            ActorRole::Supplier => &self.suppliers,
        }
    }

    pub(crate) fn directory_mut(&mut self, role: ActorRole) -> &mut ActorDirectory {
        match role {
            ActorRole::Customer => &mut self.customers,
            ActorRole::Supplier => &mut self.suppliers,
        }
    }

    // ---------------------------------------------------------------------
    // Actors
    // ---------------------------------------------------------------------

    pub fn add_customer(&mut self, customer: Actor) -> DomainResult<ActorId> {
        self.register(ActorRole::Customer, customer)
    }

    pub fn add_supplier(&mut self, supplier: Actor) -> DomainResult<ActorId> {
        self.register(ActorRole::Supplier, supplier)
    }

    fn register(&mut self, role: ActorRole, actor: Actor) -> DomainResult<ActorId> {
        let id = actor.id_typed();
        let name = actor.name().to_string();
        self.directory_mut(role)
            .insert(actor)
            .inspect_err(|e| warn!(%role, %id, error = %e, "actor not registered"))?;
        info!(%role, %id, name = %name, "actor registered");
        Ok(id)
    }

    /// Any registered actor, customer or supplier.
    pub fn actor(&self, id: ActorId) -> DomainResult<&Actor> {
        self.customers
            .get(id)
            .or_else(|| self.suppliers.get(id))
            .ok_or_else(|| DomainError::actor_not_found(id.to_string()))
    }

    /// The actor registered under `role`; an actor of the other role yields
    /// `ForeignActor`.
    fn actor_as(&self, id: ActorId, role: ActorRole) -> DomainResult<&Actor> {
        if let Some(actor) = self.directory(role).get(id) {
            return Ok(actor);
        }
        match self.actor(id) {
            Ok(other) => Err(DomainError::foreign_actor(format!(
                "{} '{}' cannot act as a {role}",
                other.role(),
                other.name()
            ))),
            Err(err) => Err(err),
        }
    }

    // ---------------------------------------------------------------------
    // Stock
    // ---------------------------------------------------------------------

    /// Register a new product with the configured default limits, place it,
    /// and record its first delivery.
    pub fn entry_record(&mut self, cmd: EntryRecord) -> DomainResult<Location> {
        let EntryRecord {
            product,
            quantity,
            supplier_id,
            reason,
            occurred_at,
        } = cmd;
        let code = product.code().clone();

        if self.inventory.contains(&code) {
            warn!(%code, "entry rejected: product already in inventory");
            return Err(DomainError::DuplicateProduct(code.to_string()));
        }

        let result = self.actor_as(supplier_id, ActorRole::Supplier).and_then(|supplier| {
            let movement = Movement::record(
                &product,
                quantity,
                supplier,
                reason,
                occurred_at,
                self.settings.markup_percent,
            )?;
            let mut stock = Stock::new(
                self.settings.default_min_stock,
                self.settings.default_max_stock,
            )?;
            stock.apply(movement.delta(), movement.clone())?;
            Ok((movement, stock))
        });
        let (movement, stock) = result.inspect_err(|e| warn!(%code, error = %e, "entry rejected"))?;

        let location = self.inventory.create_record(product, stock)?;
        self.inventory.append(movement, false)?;
        info!(%code, %location, quantity, "record entered");
        Ok(location)
    }

    /// Outbound movement to a customer.
    pub fn make_sale(&mut self, cmd: RecordSale) -> DomainResult<MovementId> {
        let id = self.record_movement(
            &cmd.code,
            cmd.customer_id,
            ActorRole::Customer,
            cmd.quantity,
            cmd.reason,
            cmd.occurred_at,
        )?;
        info!(code = %cmd.code, quantity = cmd.quantity, movement = %id, "sale recorded");
        Ok(id)
    }

    /// Inbound movement from a supplier.
    pub fn restock(&mut self, cmd: Restock) -> DomainResult<MovementId> {
        let id = self.record_movement(
            &cmd.code,
            cmd.supplier_id,
            ActorRole::Supplier,
            cmd.quantity,
            cmd.reason,
            cmd.occurred_at,
        )?;
        info!(code = %cmd.code, quantity = cmd.quantity, movement = %id, "restock recorded");
        Ok(id)
    }

    fn record_movement(
        &mut self,
        code: &ProductCode,
        actor_id: ActorId,
        role: ActorRole,
        quantity: i64,
        reason: String,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<MovementId> {
        let movement = self
            .inventory
            .require_record(code)
            .and_then(|record| {
                let actor = self.actor_as(actor_id, role)?;
                Movement::record(
                    record.product(),
                    quantity,
                    actor,
                    reason,
                    occurred_at,
                    self.settings.markup_percent,
                )
            })
            .inspect_err(|e| warn!(%code, %actor_id, error = %e, "movement rejected"))?;

        self.inventory.append(movement, true)
    }

    /// Drop a record; its movements stay in the ledger.
    pub fn remove_record(&mut self, code: &ProductCode) -> DomainResult<InventoryRecord> {
        let record = self.inventory.remove_record(code)?;
        info!(%code, "record removed");
        Ok(record)
    }

    pub fn update_stock_limits(
        &mut self,
        code: &ProductCode,
        minimum: i64,
        maximum: i64,
    ) -> DomainResult<()> {
        self.inventory
            .update_stock_limits(code, minimum, maximum)
            .inspect_err(|e| warn!(%code, minimum, maximum, error = %e, "limits rejected"))?;
        info!(%code, minimum, maximum, "stock limits updated");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    pub fn customer_history(&self, id: ActorId) -> DomainResult<Vec<&Movement>> {
        self.customers.require(id)?;
        Ok(self.inventory.movements_for_actor(id))
    }

    pub fn supplier_history(&self, id: ActorId) -> DomainResult<Vec<&Movement>> {
        self.suppliers.require(id)?;
        Ok(self.inventory.movements_for_actor(id))
    }

    // ---------------------------------------------------------------------
    // Billing
    // ---------------------------------------------------------------------

    /// Bill movements of one entity and collect payment.
    ///
    /// Nothing is stored and no movement is linked unless the payment clears.
    pub fn create_bill(
        &mut self,
        cmd: CreateBill,
        method: &dyn PaymentMethod,
    ) -> DomainResult<&Bill> {
        let entity_id = cmd.entity_id;
        let priced = self
            .actor(entity_id)
            .and_then(|entity| {
                let mut draft = DraftBill::new(entity, cmd.created_at);
                for id in &cmd.movement_ids {
                    let movement = self
                        .inventory
                        .movement(*id)
                        .ok_or_else(|| DomainError::not_found(format!("movement {id}")))?;
                    draft.add_movement(movement)?;
                }
                draft.price()
            })
            .inspect_err(|e| warn!(entity = %entity_id, error = %e, "bill rejected"))?;

        let total = priced.total();
        let paid = priced
            .pay(method)
            .inspect_err(|e| warn!(entity = %entity_id, %total, error = %e, "payment failed"))?;
        let change = paid.change();
        let (bill, movement_ids) = paid.commit();

        for movement_id in movement_ids {
            self.inventory.link_bill(movement_id, bill.id_typed())?;
        }
        info!(
            bill = %bill.id_typed(),
            entity = %entity_id,
            %total,
            %change,
            payment = bill.payment().method(),
            "bill committed"
        );

        let index = self.bills.len();
        self.bills.push(bill);
        Ok(&self.bills[index])
    }

    /// Purchases vs. sales per product, optionally for a single code.
    pub fn sales_summary(&self, only: Option<&ProductCode>) -> DomainResult<SalesSummary> {
        summarize(self.inventory.movements(), only)
    }
}
