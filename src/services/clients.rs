use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        client::{self, Entity as ClientEntity},
        project::{self, Entity as ProjectEntity},
        project_item::{self, Entity as ProjectItemEntity},
        stock_movement::{self, Entity as StockMovementEntity},
        transaction::{self, Entity as TransactionEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::PersonType,
};

/// Fields for a new client.
#[derive(Debug, Clone)]
pub struct CreateClientInput {
    pub name: String,
    pub person_type: PersonType,
    pub document: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub company_name: Option<String>,
    pub state_registration: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub active: Option<bool>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub company_name: Option<String>,
    pub state_registration: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub active: Option<bool>,
}

/// Service for managing clients
#[derive(Clone)]
pub struct ClientService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ClientService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_client(
        &self,
        input: CreateClientInput,
    ) -> Result<client::Model, ServiceError> {
        let db = &*self.db;

        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Client name must not be empty".to_string(),
            ));
        }

        let row = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            person_type: Set(input.person_type.to_string()),
            document: Set(input.document),
            email: Set(input.email),
            phone: Set(input.phone),
            mobile: Set(input.mobile),
            company_name: Set(input.company_name),
            state_registration: Set(input.state_registration),
            street: Set(input.street),
            number: Set(input.number),
            complement: Set(input.complement),
            neighborhood: Set(input.neighborhood),
            city: Set(input.city),
            state: Set(input.state),
            zip_code: Set(input.zip_code),
            country: Set(input.country),
            active: Set(input.active.unwrap_or(true)),
            total_projects: Set(0),
            total_value: Set(Decimal::ZERO),
            created_at: Set(Utc::now()),
            updated_at: Set(Some(Utc::now())),
        };

        let created = row.insert(db).await.map_err(|e| {
            error!("Failed to create client: {}", e);
            ServiceError::db_error(e)
        })?;

        self.event_sender
            .send(Event::ClientCreated(created.id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(client_id = %created.id, "Client created");

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_client(&self, id: Uuid) -> Result<Option<client::Model>, ServiceError> {
        let db = &*self.db;

        ClientEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn list_clients(
        &self,
        search: Option<String>,
        active: Option<bool>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<client::Model>, u64), ServiceError> {
        let db = &*self.db;

        let mut query = ClientEntity::find();

        if let Some(search) = search {
            let pattern = format!("%{}%", search);
            query = query.filter(
                client::Column::Name
                    .like(&pattern)
                    .or(client::Column::Email.like(&pattern)),
            );
        }
        if let Some(active) = active {
            query = query.filter(client::Column::Active.eq(active));
        }

        let paginator = query
            .order_by_asc(client::Column::Name)
            .paginate(db, limit);

        let total = paginator.num_items().await.map_err(ServiceError::db_error)?;
        let clients = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::db_error)?;

        Ok((clients, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update_client(
        &self,
        id: Uuid,
        input: UpdateClientInput,
    ) -> Result<client::Model, ServiceError> {
        let db = &*self.db;

        let existing = ClientEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", id)))?;

        let mut row: client::ActiveModel = existing.into();

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Client name must not be empty".to_string(),
                ));
            }
            row.name = Set(name);
        }
        if let Some(document) = input.document {
            row.document = Set(Some(document));
        }
        if let Some(email) = input.email {
            row.email = Set(email);
        }
        if let Some(phone) = input.phone {
            row.phone = Set(Some(phone));
        }
        if let Some(mobile) = input.mobile {
            row.mobile = Set(Some(mobile));
        }
        if let Some(company_name) = input.company_name {
            row.company_name = Set(Some(company_name));
        }
        if let Some(state_registration) = input.state_registration {
            row.state_registration = Set(Some(state_registration));
        }
        if let Some(street) = input.street {
            row.street = Set(Some(street));
        }
        if let Some(number) = input.number {
            row.number = Set(Some(number));
        }
        if let Some(complement) = input.complement {
            row.complement = Set(Some(complement));
        }
        if let Some(neighborhood) = input.neighborhood {
            row.neighborhood = Set(Some(neighborhood));
        }
        if let Some(city) = input.city {
            row.city = Set(Some(city));
        }
        if let Some(state) = input.state {
            row.state = Set(Some(state));
        }
        if let Some(zip_code) = input.zip_code {
            row.zip_code = Set(Some(zip_code));
        }
        if let Some(country) = input.country {
            row.country = Set(Some(country));
        }
        if let Some(active) = input.active {
            row.active = Set(active);
        }
        row.updated_at = Set(Some(Utc::now()));

        let updated = row.update(db).await.map_err(|e| {
            error!(client_id = %id, error = %e, "Database error when updating client");
            ServiceError::db_error(e)
        })?;

        self.event_sender
            .send(Event::ClientUpdated(updated.id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(client_id = %updated.id, "Client updated");

        Ok(updated)
    }

    /// Deletes a client together with its projects and their dependent
    /// records (items, finance transactions, stock movements).
    #[instrument(skip(self))]
    pub async fn delete_client(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;

        ClientEntity::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", id)))?;

        let project_ids: Vec<Uuid> = ProjectEntity::find()
            .filter(project::Column::ClientId.eq(id))
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        if !project_ids.is_empty() {
            TransactionEntity::delete_many()
                .filter(transaction::Column::ProjectId.is_in(project_ids.clone()))
                .exec(&txn)
                .await
                .map_err(ServiceError::db_error)?;

            StockMovementEntity::delete_many()
                .filter(stock_movement::Column::ProjectId.is_in(project_ids.clone()))
                .exec(&txn)
                .await
                .map_err(ServiceError::db_error)?;

            ProjectItemEntity::delete_many()
                .filter(project_item::Column::ProjectId.is_in(project_ids.clone()))
                .exec(&txn)
                .await
                .map_err(ServiceError::db_error)?;

            ProjectEntity::delete_many()
                .filter(project::Column::Id.is_in(project_ids))
                .exec(&txn)
                .await
                .map_err(ServiceError::db_error)?;
        }

        ClientEntity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(ServiceError::db_error)?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ClientDeleted(id))
            .await
            .map_err(ServiceError::EventError)?;

        info!(client_id = %id, "Client deleted");

        Ok(())
    }
}
