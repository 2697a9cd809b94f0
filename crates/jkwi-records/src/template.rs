//! The standard member template written into new partitions.

use serde_json::{json, Value};

/// Default member record: every namespace present with empty values and
/// status `Pending`.
pub fn member_template() -> Value {
    json!({
        "member_info": {
            "member_id": "",
            "template_id": "",
            "full_name": "",
            "first_name": "",
            "last_name": "",
            "date_of_birth": "",
            "gender": "",
            "nationality": "",
            "id_number": "",
            "passport_number": ""
        },
        "contact_info": {
            "email": "",
            "phone_primary": "",
            "phone_secondary": "",
            "address": {
                "street": "",
                "city": "",
                "province_state": "",
                "postal_code": "",
                "country": ""
            }
        },
        "jkwi_info": {
            "username": "",
            "registration_date": "",
            "status": "Pending",
            "division": "",
            "position": "",
            "supervisor": "",
            "employee_id": ""
        },
        "financial_info": {
            "bank_name": "",
            "account_number": "",
            "account_type": "",
            "swift_code": "",
            "tax_number": ""
        },
        "emergency_contact": {
            "name": "",
            "relationship": "",
            "phone": "",
            "email": "",
            "address": ""
        },
        "documents": {
            "id_document": "",
            "passport": "",
            "birth_certificate": "",
            "bank_statement": "",
            "proof_of_address": "",
            "cv_resume": ""
        },
        "system_info": {
            "created_date": "",
            "last_updated": "",
            "created_by": "",
            "updated_by": "",
            "version": "1.0",
            "backup_count": 0
        },
        "notes": "",
        "status_history": []
    })
}
