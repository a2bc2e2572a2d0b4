//! Extraction prompt.

/// Builds the prompt asking the model for the invoice JSON.
#[must_use]
pub fn build_extraction_prompt(pdf_text: &str) -> String {
    format!(
        r#"You are an expert in Brazilian invoices (notas fiscais) for an agricultural financial administration system.
Read the invoice below and extract every field requested.

INVOICE TEXT:
{pdf_text}

FIELDS:
- supplier (required): legal name (razão social), trade name (nome fantasia, optional), CNPJ formatted XX.XXX.XXX/XXXX-XX
- billed_person (when the invoice is billed to an individual): full name, CPF formatted XXX.XXX.XXX-XX
- invoice: number, issue date (YYYY-MM-DD), detailed description of the products or services, total amount with 2 decimal places
- installments (at least one): number, due date (YYYY-MM-DD), amount

Return exactly this JSON structure:
{{
  "invoice_number": "string",
  "issue_date": "YYYY-MM-DD",
  "product_description": "detailed string",
  "total_amount": "decimal",
  "supplier": {{
    "company_name": "string",
    "trade_name": "string or null",
    "tax_id": "XX.XXX.XXX/XXXX-XX"
  }},
  "billed_person": {{
    "full_name": "string",
    "document_id": "XXX.XXX.XXX-XX"
  }},
  "installments": [
    {{ "installment_number": 1, "due_date": "YYYY-MM-DD", "amount": "decimal" }}
  ],
  "installment_count": 1,
  "overall_confidence": 0.85,
  "notes": "remarks about the extraction"
}}

RULES:
1. Fill every field you can find. Mention anything you could not find in "notes".
2. Use null for billed_person when the invoice is billed to a company.
3. Dates strictly as YYYY-MM-DD. Amounts as decimals with 2 places, dot as separator.
4. List every installment. When there is a single payment, use the issue date as its due date.
5. Describe the products in detail: they drive automatic expense classification.
6. overall_confidence ranges from 0 to 1 and reflects how clear and complete the data was.

Return ONLY the JSON, with no text before or after it."#
    )
}
