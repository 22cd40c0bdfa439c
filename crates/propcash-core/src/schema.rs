//! Versioned schema registry.
//!
//! Stored tables arrive with loosely typed cells: codes held as floats,
//! amounts with thousands separators, padded text, day-first dates. The
//! registry maps every logical field to a semantic type and a parsing rule
//! and normalises a JSON row in place before it is deserialized into a
//! record type.

use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::types::{Date, LogicalTable};

/// Current schema revision.
pub const SCHEMA_VERSION: u32 = 1;

/// Semantic type of a logical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    /// Free text.
    Text,
    /// Whole number.
    Integer,
    /// Floating-point number.
    Float,
    /// Calendar date, stored as `YYYY-MM-DD`.
    Date,
}

/// How a raw cell is coerced to its semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseRule {
    /// Value must already have the right shape.
    Exact,
    /// Surrounding whitespace is removed from text.
    Trim,
    /// Numbers held as text may carry `,` thousands separators.
    StripThousands,
    /// ISO dates, ISO timestamps or day-first `DD/MM/YYYY`.
    LenientDate,
}

/// One field of a table schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Stored field name.
    pub name: &'static str,
    /// Semantic type.
    pub semantic: SemanticType,
    /// Coercion rule.
    pub rule: ParseRule,
    /// Whether null / empty cells are allowed.
    pub nullable: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, semantic: SemanticType, rule: ParseRule) -> Self {
        Self {
            name,
            semantic,
            rule,
            nullable: false,
        }
    }

    const fn text(name: &'static str) -> Self {
        Self::new(name, SemanticType::Text, ParseRule::Trim)
    }

    const fn integer(name: &'static str) -> Self {
        Self::new(name, SemanticType::Integer, ParseRule::StripThousands)
    }

    const fn float(name: &'static str) -> Self {
        Self::new(name, SemanticType::Float, ParseRule::StripThousands)
    }

    const fn date(name: &'static str) -> Self {
        Self::new(name, SemanticType::Date, ParseRule::LenientDate)
    }

    const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Schema of one logical table at one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// The table.
    pub table: LogicalTable,
    /// Schema revision.
    pub version: u32,
    /// Field specifications.
    pub fields: Vec<FieldSpec>,
}

impl TableSchema {
    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Registry of table schemas.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: BTreeMap<LogicalTable, TableSchema>,
}

impl SchemaRegistry {
    /// The built-in registry covering every logical table.
    #[must_use]
    pub fn standard() -> Self {
        let schemas = LogicalTable::ALL
            .into_iter()
            .map(|table| {
                (
                    table,
                    TableSchema {
                        table,
                        version: SCHEMA_VERSION,
                        fields: standard_fields(table),
                    },
                )
            })
            .collect();
        Self { schemas }
    }

    /// Schema for a table.
    #[must_use]
    pub fn schema(&self, table: LogicalTable) -> Option<&TableSchema> {
        self.schemas.get(&table)
    }

    /// Registers or replaces a table schema.
    pub fn register(&mut self, schema: TableSchema) {
        self.schemas.insert(schema.table, schema);
    }

    /// Normalises a stored row in place.
    ///
    /// Fields not named by the schema are left untouched. Missing nullable
    /// fields are filled with `null`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::SchemaViolation` if the row is not an object, a
    /// required field is missing, or a value cannot be coerced.
    pub fn normalize(&self, table: LogicalTable, row: Value) -> CoreResult<Value> {
        let Value::Object(mut map) = row else {
            return Err(CoreError::schema_violation(
                table.name(),
                "*",
                "row is not an object",
            ));
        };
        let Some(schema) = self.schemas.get(&table) else {
            return Ok(Value::Object(map));
        };
        for spec in &schema.fields {
            normalize_field(table, spec, &mut map)?;
        }
        Ok(Value::Object(map))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// =============================================================================
// COERCION
// =============================================================================

fn normalize_field(
    table: LogicalTable,
    spec: &FieldSpec,
    map: &mut Map<String, Value>,
) -> CoreResult<()> {
    let violation = |reason: String| CoreError::schema_violation(table.name(), spec.name, reason);

    let raw = map.remove(spec.name).unwrap_or(Value::Null);
    let is_blank = match &raw {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty() && spec.semantic != SemanticType::Text,
        _ => false,
    };
    if is_blank {
        if spec.nullable {
            map.insert(spec.name.to_string(), Value::Null);
            return Ok(());
        }
        return Err(violation("missing value".to_string()));
    }

    let value = match spec.semantic {
        SemanticType::Text => coerce_text(raw, spec.rule),
        SemanticType::Integer => coerce_integer(&raw, spec.rule).map_err(violation)?,
        SemanticType::Float => coerce_float(&raw, spec.rule).map_err(violation)?,
        SemanticType::Date => coerce_date(&raw, spec.rule).map_err(violation)?,
    };
    map.insert(spec.name.to_string(), value);
    Ok(())
}

fn coerce_text(raw: Value, rule: ParseRule) -> Value {
    let text = match raw {
        Value::String(s) => s,
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    };
    match rule {
        ParseRule::Trim => Value::String(text.trim().to_string()),
        _ => Value::String(text),
    }
}

fn numeric_text(s: &str, rule: ParseRule) -> String {
    let trimmed = s.trim();
    if rule == ParseRule::StripThousands {
        trimmed.replace(',', "")
    } else {
        trimmed.to_string()
    }
}

fn coerce_float(raw: &Value, rule: ParseRule) -> Result<Value, String> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => numeric_text(s, rule).parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("not a number: {raw}"))
}

fn coerce_integer(raw: &Value, rule: ParseRule) -> Result<Value, String> {
    let parsed = match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let text = numeric_text(s, rule);
            text.parse::<i64>().ok().or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    };
    parsed
        .map(|i| Value::Number(i.into()))
        .ok_or_else(|| format!("not an integer: {raw}"))
}

fn coerce_date(raw: &Value, rule: ParseRule) -> Result<Value, String> {
    let Value::String(s) = raw else {
        return Err(format!("not a date: {raw}"));
    };
    let parsed = if rule == ParseRule::LenientDate {
        Date::parse_lenient(s)
    } else {
        Date::parse(s)
    };
    parsed
        .map(|d| Value::String(d.to_string()))
        .map_err(|e| e.to_string())
}

// =============================================================================
// STANDARD SCHEMAS
// =============================================================================

fn property_fields() -> [FieldSpec; 3] {
    [
        FieldSpec::text("PropertyID"),
        FieldSpec::integer("PropertyCode"),
        FieldSpec::text("PropertyName"),
    ]
}

fn standard_fields(table: LogicalTable) -> Vec<FieldSpec> {
    let mut fields = Vec::new();
    match table {
        LogicalTable::TenancyCashflowLedger => {
            fields.extend(property_fields());
            fields.extend([
                FieldSpec::text("CashflowType"),
                FieldSpec::text("CreditRating").nullable(),
                FieldSpec::date("CashFlowDate"),
                FieldSpec::date("EffectiveDate"),
                FieldSpec::float("Amount"),
                FieldSpec::text("ContractedOrSpeculative"),
            ]);
        }
        LogicalTable::PropertyCashflowLedger => {
            fields.extend(property_fields());
            fields.extend([
                FieldSpec::text("CashflowType"),
                FieldSpec::date("CashFlowEffectiveDate"),
                FieldSpec::date("EffectiveDate"),
                FieldSpec::float("Amount"),
                FieldSpec::text("ContractedOrTotal"),
            ]);
        }
        LogicalTable::ChargeTypeMapping => {
            fields.extend([
                FieldSpec::text("TenantCharge"),
                FieldSpec::text("PropertyCharge"),
            ]);
        }
        LogicalTable::RiskFreeCurve => {
            fields.extend([
                FieldSpec::date("Date"),
                FieldSpec::text("Identifier"),
                FieldSpec::float("Yield"),
            ]);
        }
        LogicalTable::RiskFreeCurveDetailed => {
            fields.extend([
                FieldSpec::date("Date"),
                FieldSpec::text("Mnemonic"),
                FieldSpec::float("Open"),
                FieldSpec::float("Last"),
                FieldSpec::text("BaseCcy"),
            ]);
        }
        LogicalTable::ValuationMetricsSummary => {
            fields.extend([
                FieldSpec::text("Asset"),
                FieldSpec::text("Region").nullable(),
                FieldSpec::float("OwnershipInterest").nullable(),
                FieldSpec::float("DiscountRate").nullable(),
                FieldSpec::date("ValuationDate"),
            ]);
        }
        LogicalTable::PropertyNameMapping => {
            fields.extend([
                FieldSpec::text("MriPropertyName"),
                FieldSpec::integer("MriPropertyCode"),
                FieldSpec::text("MetricsPropertyName"),
            ]);
        }
        LogicalTable::ContractedCashflowLedger => {
            fields.extend(property_fields());
            fields.extend([
                FieldSpec::text("ChargeType"),
                FieldSpec::text("CreditRating"),
                FieldSpec::date("CashFlowDate"),
                FieldSpec::date("EffectiveDate"),
                FieldSpec::float("Amount"),
            ]);
        }
        LogicalTable::AdjustedCashflowLedger => {
            fields.extend(property_fields());
            fields.extend([
                FieldSpec::text("ChargeType"),
                FieldSpec::text("CreditRating"),
                FieldSpec::date("CashFlowDate"),
                FieldSpec::date("EffectiveDate"),
                FieldSpec::float("Amount"),
                FieldSpec::text("Region").nullable(),
                FieldSpec::float("DiscountRate").nullable(),
                FieldSpec::float("RiskFreeRate").nullable(),
                FieldSpec::float("DiscountMargin"),
                FieldSpec::float("OwnershipInterest"),
                FieldSpec::float("TimeDiff"),
                FieldSpec::float("DmAdjAmount"),
                FieldSpec::float("CLCAmount"),
                FieldSpec::date("AsAtDate"),
            ]);
        }
        LogicalTable::Dv01ResultSeries => {
            fields.extend(property_fields());
            fields.extend([
                FieldSpec::float("Sensitivity"),
                FieldSpec::integer("MissingRateRows"),
                FieldSpec::date("AsAtDate"),
            ]);
        }
    }
    fields
}
