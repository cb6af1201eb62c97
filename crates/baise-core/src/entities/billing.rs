use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Customer, PersonnelRef, Project};
use crate::enums::EntityKind;
use crate::errors::CoreError;
use crate::ids::{ObjectId, Ref};
use crate::time::{EpochMillis, Timestamps};

/// A customer payment. Provider identifiers are stored as data only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    pub customer_id: Ref<Customer>,
    pub customer_email: Option<String>,
    pub project_id: Option<Ref<Project>>,
    pub payment_description: Option<String>,
    pub payment_method: Option<String>,
    pub status: Option<String>,
    pub payment_amount: f64,
    pub inhouz_payment_id: Option<String>,
    pub stripe_intent_id: Option<String>,
    pub transaction_id: Option<String>,
    pub extra_fees: Option<f64>,
    pub payment_total_amount: Option<f64>,
    pub payment_currency: Option<String>,
    pub payment_timestamp: Option<EpochMillis>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Payment {
    #[must_use]
    pub fn new(customer_id: Ref<Customer>, payment_amount: f64) -> Self {
        Self {
            id: ObjectId::new(),
            customer_id,
            customer_email: None,
            project_id: None,
            payment_description: None,
            payment_method: None,
            status: None,
            payment_amount,
            inhouz_payment_id: None,
            stripe_intent_id: None,
            transaction_id: None,
            extra_fees: None,
            payment_total_amount: None,
            payment_currency: None,
            payment_timestamp: None,
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }
}

impl_entity!(Payment, EntityKind::Payment, {
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        std::iter::once(self.customer_id.target())
            .chain(self.project_id.map(Ref::target))
            .collect()
    }

    fn check_invariants(&self) -> Result<(), CoreError> {
        let amounts = [
            ("paymentAmount", Some(self.payment_amount)),
            ("extraFees", self.extra_fees),
            ("paymentTotalAmount", self.payment_total_amount),
        ];
        match amounts
            .into_iter()
            .find(|(_, v)| v.is_some_and(|v| !v.is_finite() || v < 0.0))
        {
            Some((field, _)) => Err(CoreError::Validation(format!(
                "{field} must be a non-negative amount"
            ))),
            None => Ok(()),
        }
    }
});

/// A payout to an annotator or QA tester for work on a project.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelPayout {
    #[serde(rename = "_id", default)]
    pub id: ObjectId,
    #[serde(flatten)]
    pub personnel: PersonnelRef,
    pub project_name: Option<String>,
    pub project_id: Option<Ref<Project>>,
    pub number_of_annotated_tasks: Option<u32>,
    pub hours_worked: Option<f64>,
    pub amount_paid: Option<f64>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl PersonnelPayout {
    #[must_use]
    pub fn new(personnel: PersonnelRef) -> Self {
        Self {
            id: ObjectId::new(),
            personnel,
            project_name: None,
            project_id: None,
            number_of_annotated_tasks: None,
            hours_worked: None,
            amount_paid: None,
            status: None,
            timestamps: Timestamps::at(EpochMillis::now()),
        }
    }
}

impl_entity!(PersonnelPayout, EntityKind::PersonnelPayout, {
    fn references(&self) -> Vec<(EntityKind, ObjectId)> {
        std::iter::once(self.personnel.target())
            .chain(self.project_id.map(Ref::target))
            .collect()
    }
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use pretty_assertions::assert_eq;

    #[test]
    fn payment_wire_names() {
        let mut payment = Payment::new(Ref::new(ObjectId::new()), 250.0);
        payment.stripe_intent_id = Some("pi_123".into());
        payment.inhouz_payment_id = Some("inh_9".into());
        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["paymentAmount"], 250.0);
        assert_eq!(json["stripeIntentId"], "pi_123");
        assert_eq!(json["inhouzPaymentId"], "inh_9");
    }

    #[test]
    fn negative_amount_is_invalid() {
        let mut payment = Payment::new(Ref::new(ObjectId::new()), 10.0);
        assert!(payment.check_invariants().is_ok());
        payment.extra_fees = Some(-1.0);
        let err = payment.check_invariants().unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation("extraFees must be a non-negative amount".into())
        );
    }

    #[test]
    fn payout_references_personnel() {
        let tester = ObjectId::new();
        let payout = PersonnelPayout::new(PersonnelRef::QaTester(Ref::new(tester)));
        assert_eq!(payout.references(), vec![(EntityKind::QaTester, tester)]);

        let json = serde_json::to_value(&payout).unwrap();
        assert_eq!(json["personnelModel"], "QaTester");
    }
}
