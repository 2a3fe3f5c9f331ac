//! Customer record types for churn scoring.
//!
//! Every input the model needs is a named, typed field. Categorical fields
//! are closed enums whose canonical strings match the vocabulary the encoder
//! was fitted on; numeric fields are plain `f64`.

use serde::{Deserialize, Serialize};

/// The 21 raw fields every record must provide, in canonical column order.
pub const REQUIRED_FIELDS: [&str; 21] = [
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    "PhoneService",
    "MultipleLines",
    "InternetService",
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
    "Contract",
    "PaperlessBilling",
    "PaymentMethod",
    "MonthlyCharges",
    "TotalCharges",
    "tenure_group",
    "MultipleServices",
];

/// Add-on service fields that share the `No / No internet service / Yes` domain.
pub const ADD_ON_FIELDS: [&str; 6] = [
    "OnlineSecurity",
    "OnlineBackup",
    "DeviceProtection",
    "TechSupport",
    "StreamingTV",
    "StreamingMovies",
];

/// Raw fields that are missing from an input, in required-field order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", .fields.join(", "))]
pub struct MissingFieldError {
    pub fields: Vec<String>,
}

impl MissingFieldError {
    #[must_use]
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }
}

/// Errors raised while building a typed record from raw text fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Missing(#[from] MissingFieldError),

    #[error("invalid value '{value}' for field {field}")]
    InvalidCategory { field: String, value: String },

    #[error("field {field} must be a finite number, got '{value}'")]
    InvalidNumber { field: String, value: String },
}

/// A closed categorical domain with canonical string values.
pub trait Categorical: Copy + Eq + Sized + 'static {
    /// All values, in the order the form presents them.
    const VARIANTS: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Parse a canonical value (exact match).
    fn parse(value: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|v| v.as_str() == value)
    }

    /// Canonical strings of every variant.
    fn options() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|v| v.as_str()).collect()
    }
}

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl Categorical for $name {
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

categorical! {
    Gender { Male => "Male", Female => "Female" }
}

categorical! {
    /// Shared domain for the plain yes/no flags.
    YesNo { Yes => "Yes", No => "No" }
}

categorical! {
    MultipleLines { No => "No", Yes => "Yes", NoPhoneService => "No phone service" }
}

categorical! {
    InternetService { Dsl => "DSL", FiberOptic => "Fiber optic", No => "No" }
}

categorical! {
    /// Domain for internet add-ons (security, backup, protection, support, streaming).
    AddOn { No => "No", Yes => "Yes", NoInternetService => "No internet service" }
}

categorical! {
    Contract { MonthToMonth => "Month-to-month", OneYear => "One year", TwoYear => "Two year" }
}

categorical! {
    PaymentMethod {
        ElectronicCheck => "Electronic check",
        MailedCheck => "Mailed check",
        BankTransfer => "Bank transfer (automatic)",
        CreditCard => "Credit card (automatic)",
    }
}

categorical! {
    TenureGroup {
        UpTo6 => "0-6",
        UpTo12 => "6-12",
        UpTo24 => "12-24",
        UpTo48 => "24-48",
        UpTo72 => "48-72",
    }
}

impl YesNo {
    #[must_use]
    pub fn from_bool(flag: bool) -> Self {
        if flag {
            Self::Yes
        } else {
            Self::No
        }
    }

    #[must_use]
    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }
}

impl TenureGroup {
    /// Bucket a tenure (months) the way the training data was bucketed.
    ///
    /// Bins are right-closed: 6 months falls in `0-6`, 7 in `6-12`.
    #[must_use]
    pub fn for_tenure(months: f64) -> Self {
        if months <= 6.0 {
            Self::UpTo6
        } else if months <= 12.0 {
            Self::UpTo12
        } else if months <= 24.0 {
            Self::UpTo24
        } else if months <= 48.0 {
            Self::UpTo48
        } else {
            Self::UpTo72
        }
    }
}

/// Inclusive range accepted by the input form for a numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl NumericRange {
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Form ranges for numeric inputs. The model itself does not enforce these.
pub static NUMERIC_RANGES: [NumericRange; 4] = [
    NumericRange { field: "tenure", min: 0.0, max: 72.0, default: 12.0, step: 1.0 },
    NumericRange { field: "MonthlyCharges", min: 18.0, max: 120.0, default: 65.0, step: 0.5 },
    NumericRange { field: "TotalCharges", min: 18.0, max: 8500.0, default: 1500.0, step: 50.0 },
    NumericRange { field: "MultipleServices", min: 0.0, max: 10.0, default: 3.0, step: 1.0 },
];

/// Look up the form range for a numeric field.
#[must_use]
pub fn numeric_range(field: &str) -> Option<&'static NumericRange> {
    NUMERIC_RANGES.iter().find(|r| r.field == field)
}

/// Kind of a raw field, with its categorical options if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Categorical(Vec<&'static str>),
    /// Senior-citizen style 0/1 flag, fed to the model numerically.
    Flag,
    Numeric,
}

/// Schema lookup for a raw field name.
#[must_use]
pub fn field_kind(field: &str) -> Option<FieldKind> {
    let kind = match field {
        "gender" => FieldKind::Categorical(Gender::options()),
        "Partner" | "Dependents" | "PhoneService" | "PaperlessBilling" => {
            FieldKind::Categorical(YesNo::options())
        }
        "MultipleLines" => FieldKind::Categorical(MultipleLines::options()),
        "InternetService" => FieldKind::Categorical(InternetService::options()),
        f if ADD_ON_FIELDS.contains(&f) => FieldKind::Categorical(AddOn::options()),
        "Contract" => FieldKind::Categorical(Contract::options()),
        "PaymentMethod" => FieldKind::Categorical(PaymentMethod::options()),
        "tenure_group" => FieldKind::Categorical(TenureGroup::options()),
        "SeniorCitizen" => FieldKind::Flag,
        "tenure" | "MonthlyCharges" | "TotalCharges" | "MultipleServices" => FieldKind::Numeric,
        _ => return None,
    };
    Some(kind)
}

/// A single raw field value as seen by feature alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
}

/// Anything that exposes raw fields by name.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl FieldSource for std::collections::BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.get(name).map(|v| FieldValue::Text(v.as_str()))
    }
}

impl FieldSource for std::collections::HashMap<String, String> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.get(name).map(|v| FieldValue::Text(v.as_str()))
    }
}

/// A fully typed customer record with the 21 model inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRecord {
    pub gender: Gender,
    pub senior_citizen: bool,
    pub partner: YesNo,
    pub dependents: YesNo,
    pub tenure: f64,
    pub phone_service: YesNo,
    pub multiple_lines: MultipleLines,
    pub internet_service: InternetService,
    pub online_security: AddOn,
    pub online_backup: AddOn,
    pub device_protection: AddOn,
    pub tech_support: AddOn,
    pub streaming_tv: AddOn,
    pub streaming_movies: AddOn,
    pub contract: Contract,
    pub paperless_billing: YesNo,
    pub payment_method: PaymentMethod,
    pub monthly_charges: f64,
    pub total_charges: f64,
    pub tenure_group: TenureGroup,
    pub multiple_services: f64,
}

impl Default for CustomerRecord {
    /// Form defaults: mid-range numerics and the first option of every field.
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            senior_citizen: false,
            partner: YesNo::Yes,
            dependents: YesNo::Yes,
            tenure: 12.0,
            phone_service: YesNo::Yes,
            multiple_lines: MultipleLines::No,
            internet_service: InternetService::Dsl,
            online_security: AddOn::No,
            online_backup: AddOn::No,
            device_protection: AddOn::No,
            tech_support: AddOn::No,
            streaming_tv: AddOn::No,
            streaming_movies: AddOn::No,
            contract: Contract::MonthToMonth,
            paperless_billing: YesNo::Yes,
            payment_method: PaymentMethod::ElectronicCheck,
            monthly_charges: 65.0,
            total_charges: 1500.0,
            tenure_group: TenureGroup::for_tenure(12.0),
            multiple_services: 3.0,
        }
    }
}

impl CustomerRecord {
    /// Build a record from raw text values.
    ///
    /// `lookup` returns the raw text for a field name, `normalize` maps a
    /// display label (e.g. a translated value) back to its canonical form.
    /// All missing fields are reported together before any parsing happens.
    ///
    /// # Errors
    /// Returns `RecordError::Missing` listing every absent field, or the first
    /// invalid categorical/numeric value encountered.
    pub fn from_raw<'a, L, N>(lookup: L, normalize: N) -> Result<Self, RecordError>
    where
        L: Fn(&str) -> Option<&'a str>,
        N: Fn(&'a str) -> &'a str,
    {
        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|&f| lookup(f).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(MissingFieldError::new(missing).into());
        }

        let text = |field: &str| -> &'a str { normalize(lookup(field).unwrap_or_default().trim()) };

        fn cat<T: Categorical>(field: &str, value: &str) -> Result<T, RecordError> {
            T::parse(value).ok_or_else(|| RecordError::InvalidCategory {
                field: field.to_string(),
                value: value.to_string(),
            })
        }

        let num = |field: &str| -> Result<f64, RecordError> {
            let raw = lookup(field).unwrap_or_default().trim();
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(RecordError::InvalidNumber {
                    field: field.to_string(),
                    value: raw.to_string(),
                }),
            }
        };

        let senior = match text("SeniorCitizen") {
            "1" | "1.0" | "Yes" | "true" => true,
            "0" | "0.0" | "No" | "false" => false,
            other => {
                return Err(RecordError::InvalidCategory {
                    field: "SeniorCitizen".to_string(),
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            gender: cat("gender", text("gender"))?,
            senior_citizen: senior,
            partner: cat("Partner", text("Partner"))?,
            dependents: cat("Dependents", text("Dependents"))?,
            tenure: num("tenure")?,
            phone_service: cat("PhoneService", text("PhoneService"))?,
            multiple_lines: cat("MultipleLines", text("MultipleLines"))?,
            internet_service: cat("InternetService", text("InternetService"))?,
            online_security: cat("OnlineSecurity", text("OnlineSecurity"))?,
            online_backup: cat("OnlineBackup", text("OnlineBackup"))?,
            device_protection: cat("DeviceProtection", text("DeviceProtection"))?,
            tech_support: cat("TechSupport", text("TechSupport"))?,
            streaming_tv: cat("StreamingTV", text("StreamingTV"))?,
            streaming_movies: cat("StreamingMovies", text("StreamingMovies"))?,
            contract: cat("Contract", text("Contract"))?,
            paperless_billing: cat("PaperlessBilling", text("PaperlessBilling"))?,
            payment_method: cat("PaymentMethod", text("PaymentMethod"))?,
            monthly_charges: num("MonthlyCharges")?,
            total_charges: num("TotalCharges")?,
            tenure_group: cat("tenure_group", text("tenure_group"))?,
            multiple_services: num("MultipleServices")?,
        })
    }

    /// Canonical text of a categorical field, or the numeric value otherwise.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<FieldValue<'static>> {
        let text = |s: &'static str| Some(FieldValue::Text(s));
        match name {
            "gender" => text(self.gender.as_str()),
            "SeniorCitizen" => Some(FieldValue::Number(f64::from(u8::from(self.senior_citizen)))),
            "Partner" => text(self.partner.as_str()),
            "Dependents" => text(self.dependents.as_str()),
            "tenure" => Some(FieldValue::Number(self.tenure)),
            "PhoneService" => text(self.phone_service.as_str()),
            "MultipleLines" => text(self.multiple_lines.as_str()),
            "InternetService" => text(self.internet_service.as_str()),
            "OnlineSecurity" => text(self.online_security.as_str()),
            "OnlineBackup" => text(self.online_backup.as_str()),
            "DeviceProtection" => text(self.device_protection.as_str()),
            "TechSupport" => text(self.tech_support.as_str()),
            "StreamingTV" => text(self.streaming_tv.as_str()),
            "StreamingMovies" => text(self.streaming_movies.as_str()),
            "Contract" => text(self.contract.as_str()),
            "PaperlessBilling" => text(self.paperless_billing.as_str()),
            "PaymentMethod" => text(self.payment_method.as_str()),
            "MonthlyCharges" => Some(FieldValue::Number(self.monthly_charges)),
            "TotalCharges" => Some(FieldValue::Number(self.total_charges)),
            "tenure_group" => text(self.tenure_group.as_str()),
            "MultipleServices" => Some(FieldValue::Number(self.multiple_services)),
            _ => None,
        }
    }

    /// Field values as CSV-ready strings, in `REQUIRED_FIELDS` order.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        REQUIRED_FIELDS
            .iter()
            .map(|f| match self.value(f) {
                Some(FieldValue::Text(s)) => s.to_string(),
                Some(FieldValue::Number(n)) => n.to_string(),
                None => String::new(),
            })
            .collect()
    }

    /// Number of subscribed services (phone, extra lines, internet and each add-on).
    #[must_use]
    pub fn subscribed_services(&self) -> u32 {
        let add_ons = [
            self.online_security,
            self.online_backup,
            self.device_protection,
            self.tech_support,
            self.streaming_tv,
            self.streaming_movies,
        ];
        u32::from(self.phone_service.is_yes())
            + u32::from(self.multiple_lines == MultipleLines::Yes)
            + u32::from(self.internet_service != InternetService::No)
            + add_ons.iter().filter(|a| **a == AddOn::Yes).count() as u32
    }

    /// Recompute the derived fields (`tenure_group`, `MultipleServices`) from the rest.
    pub fn refresh_derived(&mut self) {
        self.tenure_group = TenureGroup::for_tenure(self.tenure);
        self.multiple_services = f64::from(self.subscribed_services());
    }

    /// Check numeric fields against the form ranges.
    ///
    /// # Errors
    /// Returns one message per out-of-range field.
    pub fn validate_ranges(&self) -> Result<(), Vec<String>> {
        let errors: Vec<String> = NUMERIC_RANGES
            .iter()
            .filter_map(|range| {
                let value = match self.value(range.field) {
                    Some(FieldValue::Number(v)) => v,
                    _ => return None,
                };
                (!range.contains(value)).then(|| {
                    format!(
                        "{} must be between {} and {} (got {})",
                        range.field, range.min, range.max, value
                    )
                })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl FieldSource for CustomerRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.value(name)
    }
}

/// A record paired with an observed or predicted churn outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRecord {
    pub record: CustomerRecord,
    pub churned: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn raw_row() -> BTreeMap<String, String> {
        let values = [
            "Female", "0", "Yes", "No", "5", "Yes", "No", "Fiber optic", "No", "No", "No", "No",
            "Yes", "Yes", "Month-to-month", "Yes", "Electronic check", "89.65", "400.5", "0-6", "3",
        ];
        REQUIRED_FIELDS
            .iter()
            .zip(values)
            .map(|(k, v)| ((*k).to_string(), v.to_string()))
            .collect()
    }

    fn parse(row: &BTreeMap<String, String>) -> Result<CustomerRecord, RecordError> {
        CustomerRecord::from_raw(|f| row.get(f).map(String::as_str), |v| v)
    }

    #[test]
    fn test_parse_valid_row() {
        let record = parse(&raw_row()).expect("row should parse");
        assert_eq!(record.gender, Gender::Female);
        assert!(!record.senior_citizen);
        assert_eq!(record.internet_service, InternetService::FiberOptic);
        assert_eq!(record.contract, Contract::MonthToMonth);
        assert_eq!(record.tenure_group, TenureGroup::UpTo6);
        assert!((record.monthly_charges - 89.65).abs() < 1e-12);
    }

    #[test]
    fn test_missing_fields_are_all_listed() {
        let mut row = raw_row();
        row.remove("Contract");
        row.remove("tenure");

        match parse(&row) {
            Err(RecordError::Missing(err)) => {
                assert_eq!(err.fields, vec!["tenure".to_string(), "Contract".to_string()]);
            }
            other => panic!("expected missing field error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_category_rejected() {
        let mut row = raw_row();
        row.insert("Contract".into(), "Three year".into());
        let err = parse(&row).expect_err("unknown contract should fail");
        assert_eq!(
            err,
            RecordError::InvalidCategory { field: "Contract".into(), value: "Three year".into() }
        );
    }

    #[test]
    fn test_non_numeric_rejected() {
        let mut row = raw_row();
        row.insert("TotalCharges".into(), " ".into());
        assert!(matches!(parse(&row), Err(RecordError::InvalidNumber { .. })));

        row.insert("TotalCharges".into(), "NaN".into());
        assert!(matches!(parse(&row), Err(RecordError::InvalidNumber { .. })));
    }

    #[test]
    fn test_to_row_matches_required_order() {
        let row = raw_row();
        let record = parse(&row).expect("row should parse");
        let out = record.to_row();
        assert_eq!(out.len(), REQUIRED_FIELDS.len());
        assert_eq!(out[0], "Female");
        assert_eq!(out[14], "Month-to-month");
        assert_eq!(out[17], "89.65");
    }

    #[test]
    fn test_tenure_group_bins() {
        assert_eq!(TenureGroup::for_tenure(0.0), TenureGroup::UpTo6);
        assert_eq!(TenureGroup::for_tenure(6.0), TenureGroup::UpTo6);
        assert_eq!(TenureGroup::for_tenure(7.0), TenureGroup::UpTo12);
        assert_eq!(TenureGroup::for_tenure(24.0), TenureGroup::UpTo24);
        assert_eq!(TenureGroup::for_tenure(60.0), TenureGroup::UpTo72);
    }

    #[test]
    fn test_subscribed_services() {
        let mut record = parse(&raw_row()).expect("row should parse");
        // phone + internet + two streaming add-ons
        assert_eq!(record.subscribed_services(), 4);

        record.tenure = 30.0;
        record.refresh_derived();
        assert_eq!(record.tenure_group, TenureGroup::UpTo48);
        assert_eq!(record.multiple_services, 4.0);
    }

    #[test]
    fn test_validate_ranges() {
        let mut record = CustomerRecord::default();
        assert!(record.validate_ranges().is_ok());

        record.tenure = 80.0;
        record.monthly_charges = 5.0;
        let errors = record.validate_ranges().expect_err("out of range");
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_field_kind_lookup() {
        assert_eq!(field_kind("tenure"), Some(FieldKind::Numeric));
        assert_eq!(field_kind("SeniorCitizen"), Some(FieldKind::Flag));
        assert!(matches!(field_kind("TechSupport"), Some(FieldKind::Categorical(opts)) if opts.len() == 3));
        assert_eq!(field_kind("Churn"), None);
    }
}
