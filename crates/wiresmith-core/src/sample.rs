//! Starter document handed out to authors.

use serde_json::{json, Value};

/// A canonical document touching every feature of the format.
///
/// It validates without errors or warnings.
pub fn sample_document() -> Value {
    json!({
        "version": "1.0",
        "target": {
            "baseUrl": "http://localhost:8080",
            "auth": {"type": "bearer", "token": "change-me"}
        },
        "defaults": {
            "priority": 5,
            "headers": {"Content-Type": "application/json"},
            "templatingEnabled": false
        },
        "mocks": [
            {
                "name": "health check",
                "request": {"method": "GET", "url": "/health"},
                "response": {
                    "status": 200,
                    "body": {"type": "inline", "value": "{\"status\":\"UP\"}"}
                }
            },
            {
                "name": "search users",
                "request": {
                    "method": "GET",
                    "urlPath": "/users",
                    "queryParameters": {
                        "q": {"contains": "smith"},
                        "page": {"matches": "[0-9]+"}
                    }
                },
                "response": {
                    "status": 200,
                    "body": {"type": "file", "fileName": "users.json"}
                }
            },
            {
                "name": "get user",
                "priority": 1,
                "request": {
                    "method": "GET",
                    "pathTemplate": "/users/{id}",
                    "headers": {"Accept": {"equalTo": "application/json"}}
                },
                "response": {
                    "status": 200,
                    "body": {
                        "type": "inline",
                        "value": "{\"id\":\"{{request.path.[1]}}\"}",
                        "templating": true
                    }
                }
            },
            {
                "name": "create order",
                "request": {
                    "method": "POST",
                    "urlPathPattern": "/orders(/.*)?",
                    "cookies": {"session": {"matches": "[a-f0-9]{32}"}},
                    "bodyPatterns": [
                        {"matchesJsonPath": "$.items"},
                        {"equalToJson": {"json": {"currency": "EUR"}, "ignoreExtraElements": true}}
                    ]
                },
                "response": {
                    "status": 201,
                    "headers": {"Location": "/orders/1"},
                    "fixedDelayMilliseconds": 250,
                    "body": {"type": "inline", "value": "{\"id\":1}"}
                },
                "scenario": {
                    "name": "order lifecycle",
                    "requiredState": "Started",
                    "newState": "Created"
                },
                "metadata": {"owner": "checkout-team"}
            },
            {
                "name": "legacy reports",
                "request": {"method": "ANY", "urlPattern": "/reports/.*"},
                "response": {
                    "status": 200,
                    "proxyBaseUrl": "http://reports.internal:9000"
                }
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::generate;

    #[test]
    fn test_sample_is_clean() {
        let generation = generate(&sample_document()).unwrap();
        assert!(generation.warnings.is_empty(), "{:?}", generation.warnings);
        assert!(generation.failures.is_empty());
        assert_eq!(generation.mappings.len(), 5);
    }
}
