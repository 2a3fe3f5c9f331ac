//! Bilingual display labels.
//!
//! Canonical (English) field names and values are what the encoder and model
//! understand; Spanish labels are what the dashboard shows. The catalog keeps
//! both directions so user-facing input can be normalized back.

use std::collections::HashMap;

const COLUMN_LABELS: [(&str, &str); 21] = [
    ("gender", "Género"),
    ("SeniorCitizen", "Ciudadano Senior"),
    ("Partner", "Tiene Pareja"),
    ("Dependents", "Dependientes"),
    ("tenure", "Meses Permanencia"),
    ("PhoneService", "Servicio Telefónico"),
    ("MultipleLines", "Líneas Múltiples"),
    ("InternetService", "Servicio de Internet"),
    ("OnlineSecurity", "Seguridad en Línea"),
    ("OnlineBackup", "Respaldo en Línea"),
    ("DeviceProtection", "Protección de Dispositivos"),
    ("TechSupport", "Soporte Técnico"),
    ("StreamingTV", "Streaming TV"),
    ("StreamingMovies", "Streaming Películas"),
    ("Contract", "Tipo de Contrato"),
    ("PaperlessBilling", "Facturación Electrónica"),
    ("PaymentMethod", "Método de Pago"),
    ("MonthlyCharges", "Cargos Mensuales"),
    ("TotalCharges", "Cargos Totales"),
    ("tenure_group", "Grupo de Permanencia"),
    ("MultipleServices", "Cantidad de Servicios"),
];

const VALUE_LABELS: [(&str, &str); 15] = [
    ("Female", "Femenino"),
    ("Male", "Masculino"),
    ("Yes", "Sí"),
    ("No", "No"),
    ("No internet service", "Sin servicio"),
    ("No phone service", "Sin servicio telefónico"),
    ("Fiber optic", "Fibra óptica"),
    ("DSL", "DSL"),
    ("Month-to-month", "Mensual"),
    ("One year", "Un año"),
    ("Two year", "Dos años"),
    ("Electronic check", "Cheque electrónico"),
    ("Mailed check", "Cheque físico"),
    ("Bank transfer (automatic)", "Transferencia bancaria (automática)"),
    ("Credit card (automatic)", "Tarjeta de crédito (automática)"),
];

/// Immutable English/Spanish lookup tables, built once at startup.
#[derive(Debug, Clone)]
pub struct LabelCatalog {
    column_to_label: HashMap<&'static str, &'static str>,
    label_to_column: HashMap<&'static str, &'static str>,
    value_to_label: HashMap<&'static str, &'static str>,
    label_to_value: HashMap<&'static str, &'static str>,
}

impl Default for LabelCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            column_to_label: COLUMN_LABELS.iter().copied().collect(),
            label_to_column: COLUMN_LABELS.iter().map(|&(c, l)| (l, c)).collect(),
            value_to_label: VALUE_LABELS.iter().copied().collect(),
            label_to_value: VALUE_LABELS.iter().map(|&(v, l)| (l, v)).collect(),
        }
    }

    /// Spanish label for a raw column name (falls back to the name itself).
    #[must_use]
    pub fn column_label<'a>(&self, column: &'a str) -> &'a str {
        self.column_to_label.get(column).copied().unwrap_or(column)
    }

    /// Raw column name for a Spanish label, if it is one.
    #[must_use]
    pub fn column_for_label(&self, label: &str) -> Option<&'static str> {
        self.label_to_column.get(label).copied()
    }

    /// Spanish label for a canonical value (falls back to the value itself).
    #[must_use]
    pub fn value_label<'a>(&self, value: &'a str) -> &'a str {
        self.value_to_label.get(value).copied().unwrap_or(value)
    }

    /// Canonical value for either a canonical value or its Spanish label.
    #[must_use]
    pub fn canonical_value<'a>(&self, value: &'a str) -> &'a str {
        self.label_to_value.get(value).copied().unwrap_or(value)
    }

    /// Human-readable name for an encoded feature such as `Contract_Two year`.
    ///
    /// Encoded names are split on the longest known raw column prefix so that
    /// `tenure_group_0-6` resolves to the tenure-group column, not `tenure`.
    #[must_use]
    pub fn feature_label(&self, feature: &str) -> String {
        if let Some(label) = self.column_to_label.get(feature) {
            return (*label).to_string();
        }

        let prefix = COLUMN_LABELS
            .iter()
            .map(|&(c, _)| c)
            .filter(|c| {
                feature.len() > c.len() + 1
                    && feature.starts_with(c)
                    && feature.as_bytes()[c.len()] == b'_'
            })
            .max_by_key(|c| c.len());

        match prefix {
            Some(column) => {
                let value = &feature[column.len() + 1..];
                format!("{}: {}", self.column_label(column), self.value_label(value))
            }
            None => feature.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_labels_both_directions() {
        let labels = LabelCatalog::new();
        assert_eq!(labels.column_label("Contract"), "Tipo de Contrato");
        assert_eq!(labels.column_for_label("Tipo de Contrato"), Some("Contract"));
        assert_eq!(labels.column_label("unknown"), "unknown");
    }

    #[test]
    fn test_values_normalize_to_canonical() {
        let labels = LabelCatalog::new();
        assert_eq!(labels.canonical_value("Fibra óptica"), "Fiber optic");
        assert_eq!(labels.canonical_value("Sí"), "Yes");
        assert_eq!(labels.canonical_value("Fiber optic"), "Fiber optic");
        assert_eq!(labels.value_label("Month-to-month"), "Mensual");
    }

    #[test]
    fn test_feature_label_uses_longest_prefix() {
        let labels = LabelCatalog::new();
        assert_eq!(labels.feature_label("tenure"), "Meses Permanencia");
        assert_eq!(labels.feature_label("tenure_group_0-6"), "Grupo de Permanencia: 0-6");
        assert_eq!(labels.feature_label("Contract_Two year"), "Tipo de Contrato: Dos años");
        assert_eq!(labels.feature_label("mystery"), "mystery");
    }
}
