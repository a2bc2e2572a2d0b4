//! Validation and normalization of model output.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use super::error::ExtractionError;
use super::types::{
    ExtractedBilledPerson, ExtractedInstallment, ExtractedInvoice, ExtractedSupplier,
    RawBilledPerson, RawInstallment, RawInvoice, RawSupplier,
};
use crate::account::validate_document_number;
use crate::people::{normalize_cnpj, normalize_cpf};

/// Parses an ISO date, accepting the Brazilian `DD/MM/YYYY` form as well.
pub fn parse_date(field: &str, value: Option<&str>) -> Result<NaiveDate, ExtractionError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ExtractionError::invalid(format!("{field} is required")))?;

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .map_err(|_| ExtractionError::invalid(format!("{field} must be a YYYY-MM-DD date")))
}

/// Parses a monetary amount given as a JSON number or string.
///
/// Strings may carry a `R$` prefix and Brazilian separators
/// (`1.234,56`). The result is rounded to cents.
pub fn parse_amount(field: &str, value: Option<&Value>) -> Result<Decimal, ExtractionError> {
    let invalid = || ExtractionError::invalid(format!("{field} must be a decimal amount"));

    let text = match value {
        None | Some(Value::Null) => {
            return Err(ExtractionError::invalid(format!("{field} is required")));
        }
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => normalize_amount_text(s),
        Some(_) => return Err(invalid()),
    };

    let amount: Decimal = text.parse().map_err(|_| invalid())?;
    Ok(amount.round_dp(2))
}

fn normalize_amount_text(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    match (cleaned.rfind(','), cleaned.rfind('.')) {
        // 1.234,56 or 1234,56
        (Some(comma), dot) if dot.is_none_or(|d| d < comma) => {
            cleaned.replace('.', "").replace(',', ".")
        }
        // 1,234.56
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // 1.500 or 1.234.567: dots group thousands
        (None, Some(_)) if is_thousands_grouped(&cleaned) => cleaned.replace('.', ""),
        _ => cleaned,
    }
}

/// True for `1.500`, `12.345.678`; false for `1.5`, `0.125`, `1500.00`.
fn is_thousands_grouped(value: &str) -> bool {
    let mut groups = value.trim_start_matches('-').split('.');
    let leading_ok = groups.next().is_some_and(|g| {
        (1..=3).contains(&g.len())
            && !g.starts_with('0')
            && g.chars().all(|c| c.is_ascii_digit())
    });
    leading_ok && groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

fn parse_decimal_lenient(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => normalize_amount_text(s).parse().ok(),
        _ => None,
    }
}

fn parse_integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_supplier(raw: Option<RawSupplier>) -> Result<ExtractedSupplier, ExtractionError> {
    let raw = raw.ok_or_else(|| ExtractionError::invalid("supplier is required"))?;
    let company_name = non_blank(raw.company_name)
        .ok_or_else(|| ExtractionError::invalid("supplier company_name is required"))?;
    let tax_id = non_blank(raw.tax_id)
        .ok_or_else(|| ExtractionError::invalid("supplier tax_id is required"))?;

    Ok(ExtractedSupplier {
        company_name,
        trade_name: non_blank(raw.trade_name),
        tax_id: normalize_cnpj(&tax_id).unwrap_or(tax_id),
    })
}

fn validate_billed_person(raw: Option<RawBilledPerson>) -> Option<ExtractedBilledPerson> {
    let raw = raw?;
    let full_name = non_blank(raw.full_name)?;
    let document_id = non_blank(raw.document_id)?;
    Some(ExtractedBilledPerson {
        full_name,
        document_id: normalize_cpf(&document_id).unwrap_or(document_id),
    })
}

fn validate_installments(
    raw: Vec<RawInstallment>,
    issue_date: NaiveDate,
    total_amount: Decimal,
) -> Result<Vec<ExtractedInstallment>, ExtractionError> {
    if raw.is_empty() {
        return Ok(vec![ExtractedInstallment {
            installment_number: 1,
            due_date: issue_date,
            amount: total_amount,
        }]);
    }

    raw.into_iter()
        .enumerate()
        .map(|(index, installment)| {
            let position = i32::try_from(index + 1).unwrap_or(i32::MAX);
            let installment_number = parse_integer(installment.installment_number.as_ref())
                .and_then(|n| i32::try_from(n).ok())
                .filter(|n| *n >= 1)
                .unwrap_or(position);
            let label = format!("installment {installment_number}");

            let due_date = parse_date(&format!("{label} due_date"), installment.due_date.as_deref())?;
            let amount = parse_amount(&format!("{label} amount"), installment.amount.as_ref())?;
            if amount <= Decimal::ZERO {
                return Err(ExtractionError::invalid(format!(
                    "{label} amount must be greater than zero"
                )));
            }

            Ok(ExtractedInstallment {
                installment_number,
                due_date,
                amount,
            })
        })
        .collect()
}

/// Validates model output and fills in defaults.
///
/// Classifications are left empty; the caller runs the classifier with
/// the full invoice text.
pub fn validate_invoice(raw: RawInvoice) -> Result<ExtractedInvoice, ExtractionError> {
    let issue_date = parse_date("issue_date", raw.issue_date.as_deref())?;
    let total_amount = parse_amount("total_amount", raw.total_amount.as_ref())?;
    if total_amount <= Decimal::ZERO {
        return Err(ExtractionError::invalid(
            "total_amount must be greater than zero",
        ));
    }

    let product_description = non_blank(raw.product_description)
        .ok_or_else(|| ExtractionError::invalid("product_description is required"))?;
    let invoice_number = validate_document_number("invoice_number", raw.invoice_number.as_deref())
        .map_err(|e| ExtractionError::invalid(e.to_string()))?;

    let supplier = validate_supplier(raw.supplier)?;
    let billed_person = validate_billed_person(raw.billed_person);
    let installments = validate_installments(raw.installments, issue_date, total_amount)?;

    let installment_count = parse_integer(raw.installment_count.as_ref())
        .and_then(|n| i32::try_from(n).ok())
        .filter(|n| *n >= 1)
        .unwrap_or_else(|| i32::try_from(installments.len()).unwrap_or(i32::MAX));

    let overall_confidence = parse_decimal_lenient(raw.overall_confidence.as_ref())
        .unwrap_or(Decimal::ZERO)
        .clamp(Decimal::ZERO, Decimal::ONE);

    Ok(ExtractedInvoice {
        invoice_number,
        issue_date,
        product_description,
        total_amount,
        supplier,
        billed_person,
        installments,
        installment_count,
        overall_confidence,
        notes: non_blank(raw.notes),
        classifications: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn raw(value: serde_json::Value) -> RawInvoice {
        serde_json::from_value(value).unwrap()
    }

    fn minimal() -> serde_json::Value {
        json!({
            "invoice_number": "4721",
            "issue_date": "2025-02-14",
            "product_description": "OLEO DIESEL B S10 - 1000 litros",
            "total_amount": "6390.00",
            "supplier": {
                "company_name": "Posto Cerrado Ltda",
                "tax_id": "12345678000190"
            }
        })
    }

    #[test]
    fn test_synthesizes_single_installment() {
        let invoice = validate_invoice(raw(minimal())).unwrap();
        assert_eq!(invoice.installments.len(), 1);
        assert_eq!(invoice.installments[0].installment_number, 1);
        assert_eq!(invoice.installments[0].due_date, invoice.issue_date);
        assert_eq!(invoice.installments[0].amount, dec!(6390.00));
        assert_eq!(invoice.installment_count, 1);
        assert_eq!(invoice.supplier.tax_id, "12.345.678/0001-90");
        assert!(invoice.billed_person.is_none());
        assert_eq!(invoice.overall_confidence, Decimal::ZERO);
    }

    #[test]
    fn test_installments_and_confidence() {
        let mut value = minimal();
        value["installments"] = json!([
            {"installment_number": 1, "due_date": "2025-03-14", "amount": 3195},
            {"installment_number": "2", "due_date": "14/04/2025", "amount": "3.195,00"}
        ]);
        value["overall_confidence"] = json!(1.7);
        value["billed_person"] = json!({"full_name": "João Silva", "document_id": "12345678901"});

        let invoice = validate_invoice(raw(value)).unwrap();
        assert_eq!(invoice.installments.len(), 2);
        assert_eq!(invoice.installments[1].installment_number, 2);
        assert_eq!(
            invoice.installments[1].due_date,
            NaiveDate::from_ymd_opt(2025, 4, 14).unwrap()
        );
        assert_eq!(invoice.installments[1].amount, dec!(3195));
        assert_eq!(invoice.installment_count, 2);
        assert_eq!(invoice.overall_confidence, Decimal::ONE);
        assert_eq!(
            invoice.billed_person.unwrap().document_id,
            "123.456.789-01"
        );
    }

    #[test]
    fn test_missing_required_fields() {
        let mut value = minimal();
        value["issue_date"] = json!(null);
        assert!(validate_invoice(raw(value)).is_err());

        let mut value = minimal();
        value["total_amount"] = json!("0");
        assert!(validate_invoice(raw(value)).is_err());

        let mut value = minimal();
        value["supplier"] = json!({"company_name": "X"});
        let err = validate_invoice(raw(value)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "extracted data is invalid: supplier tax_id is required"
        );
    }

    #[test]
    fn test_unnormalizable_tax_id_is_kept() {
        let mut value = minimal();
        value["supplier"]["tax_id"] = json!("123");
        let invoice = validate_invoice(raw(value)).unwrap();
        assert_eq!(invoice.supplier.tax_id, "123");
    }

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("a", Some(&json!("R$ 1.234,56"))).unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("a", Some(&json!("1,234.56"))).unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("a", Some(&json!("89,9"))).unwrap(), dec!(89.9));
        assert_eq!(parse_amount("a", Some(&json!("1500.00"))).unwrap(), dec!(1500.00));
        assert_eq!(parse_amount("a", Some(&json!("12.5"))).unwrap(), dec!(12.5));
        assert_eq!(parse_amount("a", Some(&json!(10.005))).unwrap(), dec!(10.00));
        assert!(parse_amount("a", Some(&json!(true))).is_err());
        assert!(parse_amount("a", None).is_err());
    }

    #[test]
    fn test_dot_grouped_thousands() {
        assert_eq!(parse_amount("a", Some(&json!("R$ 1.500"))).unwrap(), dec!(1500));
        assert_eq!(parse_amount("a", Some(&json!("1.234.567"))).unwrap(), dec!(1234567));
        assert_eq!(parse_amount("a", Some(&json!("0.125"))).unwrap(), dec!(0.12));
        assert_eq!(parse_amount("a", Some(&json!("1.2345"))).unwrap(), dec!(1.23));
    }
}
