use chrono::NaiveDate;
use shared::CreatePaymentRequest;
use tracing::info;

use crate::db::DbConnection;
use crate::error::{is_unique_violation, DomainError, DomainResult};
use crate::storage::{ClientRepository, PaymentRepository, PlanRepository};

/// Service for recording and listing payments
#[derive(Clone)]
pub struct PaymentService {
    db: DbConnection,
    payments: PaymentRepository,
}

impl PaymentService {
    pub fn new(db: DbConnection) -> Self {
        let payments = PaymentRepository::new(db.clone());
        Self { db, payments }
    }

    /// Record a payment for a client.
    ///
    /// The amount is the named plan's current monthly price, not a price
    /// frozen at signup. A client can record at most one payment per
    /// calendar date.
    pub async fn create_payment(&self, request: CreatePaymentRequest) -> DomainResult<i64> {
        info!(
            "Recording payment: client={}, plan={}, date={}",
            request.client, request.plan, request.date
        );

        let date = parse_date("date", &request.date)?;

        let mut tx = self.db.pool().begin().await?;

        let client = ClientRepository::find_by_name(&mut tx, request.client.trim())
            .await?
            .ok_or_else(|| DomainError::unresolved("client", request.client.trim()))?;
        let plan = PlanRepository::find_by_name(&mut tx, request.plan.trim())
            .await?
            .ok_or_else(|| DomainError::unresolved("plan", request.plan.trim()))?;

        if PaymentRepository::exists_for_date(&mut tx, client.id, date).await? {
            return Err(DomainError::duplicate(
                "payment",
                format!("client '{}' already has a payment on {}", client.name, date),
            ));
        }

        let id = PaymentRepository::insert(&mut tx, client.id, date, plan.monthly_price, plan.id)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DomainError::duplicate(
                        "payment",
                        format!("client '{}' already has a payment on {}", client.name, date),
                    )
                } else {
                    e.into()
                }
            })?;

        tx.commit().await?;
        info!(
            "Recorded payment of {:.2} for client '{}' on {}",
            plan.monthly_price, client.name, date
        );
        Ok(id)
    }

    /// List all payments for the payments page
    pub async fn list(&self) -> DomainResult<Vec<shared::PaymentDto>> {
        Ok(self.payments.list().await?)
    }
}

pub(crate) fn parse_date(field: &'static str, value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        DomainError::validation(field, format!("'{}' is not a valid YYYY-MM-DD date", value))
    })
}
