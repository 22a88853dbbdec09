//! OpenAPI 3.0 description of the REST API, served at `/api-docs`.

use serde_json::{json, Value};

use aurum_ledger::OwnerStatus;

fn vault_id_param() -> Value {
    json!({
        "name": "vault_id",
        "in": "path",
        "required": true,
        "schema": { "type": "string" },
        "example": "ZH-001"
    })
}

fn query_param(name: &str, description: &str, schema: Value) -> Value {
    json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": schema
    })
}

fn contract_read(summary: &str, schema_ref: &str) -> Value {
    json!({
        "get": {
            "tags": ["Contract"],
            "summary": summary,
            "responses": {
                "200": {
                    "description": "Value read from the contract",
                    "content": { "application/json": { "schema": { "$ref": schema_ref } } }
                },
                "500": {
                    "description": "Contract read failed",
                    "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ContractError" } } }
                }
            }
        }
    })
}

fn fee_amount() -> Value {
    json!({
        "type": "object",
        "properties": {
            "raw": { "type": "string" },
            "formatted": { "type": "string" }
        }
    })
}

/// Builds the full document.
pub fn document() -> Value {
    let statuses: Vec<&str> = OwnerStatus::ALL.iter().map(|s| s.as_str()).collect();

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Mock Vault API",
            "version": "1.0.0",
            "description": "Custodial gold bar records and on-chain reserve reads"
        },
        "tags": [
            { "name": "Vaults", "description": "Vault and bar records" },
            { "name": "Contract", "description": "Reserve contract reads" },
            { "name": "Health", "description": "Service liveness" }
        ],
        "paths": {
            "/health": {
                "get": {
                    "tags": ["Health"],
                    "summary": "Liveness probe",
                    "responses": {
                        "200": {
                            "description": "Service is up",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": { "status": { "type": "string", "example": "healthy" } }
                            } } }
                        }
                    }
                }
            },
            "/vaults": {
                "get": {
                    "tags": ["Vaults"],
                    "summary": "List all vaults",
                    "responses": {
                        "200": {
                            "description": "Vault summaries",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": {
                                    "total_vaults": { "type": "integer" },
                                    "vaults": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/VaultSummary" }
                                    }
                                }
                            } } }
                        }
                    }
                }
            },
            "/vaults/{vault_id}/bars": {
                "get": {
                    "tags": ["Vaults"],
                    "summary": "List the bars of a vault",
                    "parameters": [
                        vault_id_param(),
                        query_param("owner_id", "Exact owner match", json!({ "type": "string" })),
                        query_param("owner_status", "Exact status match", json!({ "type": "string", "enum": statuses })),
                        query_param("purity_min", "Inclusive lower purity bound", json!({ "type": "number" })),
                        query_param("purity_max", "Inclusive upper purity bound", json!({ "type": "number" })),
                        query_param("limit", "Page size, all remaining bars when absent", json!({ "type": "integer" })),
                        query_param("offset", "Bars to skip", json!({ "type": "integer", "default": 0 }))
                    ],
                    "responses": {
                        "200": {
                            "description": "One page of matching bars",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/BarPage" } } }
                        },
                        "404": {
                            "description": "Unknown vault",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/VaultNotFound" } } }
                        }
                    }
                }
            },
            "/vaults/{vault_id}/vault_reserve": {
                "get": {
                    "tags": ["Vaults"],
                    "summary": "Reserve summary, from the contract when reachable",
                    "parameters": [vault_id_param()],
                    "responses": {
                        "200": {
                            "description": "Reserve summary",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/VaultReserve" } } }
                        },
                        "404": {
                            "description": "Unknown vault",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/VaultNotFound" } } }
                        }
                    }
                }
            },
            "/contract/vault-ounces": contract_read("Total ounces held by the vault", "#/components/schemas/TokenAmount"),
            "/contract/current-rate": contract_read("Current redemption rate", "#/components/schemas/TokenAmount"),
            "/contract/fee-accumulator": contract_read("Fee recipient address", "#/components/schemas/FeeAccumulator"),
            "/contract/collected-fees": contract_read("All collected fee counters", "#/components/schemas/CollectedFees"),
            "/contract/info": {
                "get": {
                    "tags": ["Contract"],
                    "summary": "Contract deployment parameters",
                    "responses": {
                        "200": {
                            "description": "Configured contract",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ContractInfo" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Bar": {
                    "type": "object",
                    "properties": {
                        "record_id": { "type": "integer" },
                        "serial_number": { "type": "string" },
                        "weight_grams": { "type": "number" },
                        "purity": { "type": "number" },
                        "delivery_date": { "type": "string", "format": "date" },
                        "owner_id": { "type": "string" },
                        "owner_status": { "type": "string", "enum": statuses }
                    }
                },
                "VaultSummary": {
                    "type": "object",
                    "properties": {
                        "vault_id": { "type": "string" },
                        "total_bars": { "type": "integer" },
                        "total_weight_grams": { "type": "number" }
                    }
                },
                "BarPage": {
                    "type": "object",
                    "properties": {
                        "vault_id": { "type": "string" },
                        "total_bars": { "type": "integer" },
                        "total_weight_grams": { "type": "number" },
                        "total_oz": { "type": "number" },
                        "bars": { "type": "array", "items": { "$ref": "#/components/schemas/Bar" } }
                    }
                },
                "VaultReserve": {
                    "type": "object",
                    "properties": {
                        "vault_id": { "type": "string" },
                        "total_bars": { "type": "integer" },
                        "total_weight_grams": { "type": "number" },
                        "total_weight_oz": { "type": "number" },
                        "contract_source": { "type": "boolean" },
                        "error": { "type": "string" }
                    }
                },
                "VaultNotFound": {
                    "type": "object",
                    "properties": {
                        "error": { "type": "string" },
                        "vault_id": { "type": "string" }
                    }
                },
                "TokenAmount": {
                    "type": "object",
                    "properties": {
                        "raw": { "type": "string" },
                        "formatted": { "type": "string" },
                        "decimals": { "type": "integer" }
                    }
                },
                "FeeAccumulator": {
                    "type": "object",
                    "properties": { "address": { "type": "string" } }
                },
                "CollectedFees": {
                    "type": "object",
                    "properties": {
                        "feeCollected": fee_amount(),
                        "mintFeesCollected": fee_amount(),
                        "custodyFeesCollected": fee_amount()
                    }
                },
                "ContractInfo": {
                    "type": "object",
                    "properties": {
                        "contractAddress": { "type": "string" },
                        "chainId": { "type": "integer" },
                        "chainName": { "type": "string" },
                        "rpcUrl": { "type": "string" }
                    }
                },
                "ContractError": {
                    "type": "object",
                    "properties": {
                        "error": { "type": "string" },
                        "message": { "type": "string" }
                    }
                }
            }
        }
    })
}
