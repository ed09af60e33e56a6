use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use sui_reified::decoder::{to_bcs, to_json};
use sui_reified::rpc::{MockObjectClient, RemoteObject};
use sui_reified::{Canonicalizer, DescriptorRegistry, ReifiedError, RegistryBuilder, SourceEncoding, StructDecoder};

const PKG: &str = "0xbd8fc1947cf119350184107a3087e2dc27efefa0dd82e25a1f699069fe81a585";

// Mirrors of the on-chain layouts, encoded with the reference BCS serializer.

#[derive(Serialize)]
struct Uid {
    id: [u8; 32],
}

#[derive(Serialize)]
struct Item {
    id: Uid,
    level: u64,
    power: u32,
    name: String,
}

#[derive(Serialize)]
struct Attributes {
    rarity: u8,
    weight: u16,
    tags: Vec<String>,
}

#[derive(Serialize)]
struct Entry {
    key: String,
    value: u64,
}

#[derive(Serialize)]
struct Builder {
    id: Uid,
    kind: String,
    items_added: u64,
    attributes: Attributes,
    manufacturer: Option<String>,
    colour_ways: Vec<Attributes>,
    owner: [u8; 32],
    total_supply: u128,
    /// u256, little-endian
    score: [u8; 32],
    price: u64,
    rule: bool,
    metadata: Vec<Entry>,
    icon: String,
    discount: Option<u8>,
}

fn registry() -> Arc<DescriptorRegistry> {
    let registry = RegistryBuilder::new(Canonicalizer::default())
        .load_schema_file(concat!(env!("CARGO_MANIFEST_DIR"), "/schema/anima.json"))
        .unwrap()
        .build()
        .unwrap();
    Arc::new(registry)
}

fn sample_builder() -> Builder {
    let mut score = [0u8; 32];
    score[0] = 7;
    Builder {
        id: Uid { id: [0x33; 32] },
        kind: "helm".to_string(),
        items_added: 2_833,
        attributes: Attributes {
            rarity: 4,
            weight: 1_200,
            tags: vec!["mythic".to_string()],
        },
        manufacturer: None,
        colour_ways: vec![
            Attributes {
                rarity: 1,
                weight: 10,
                tags: vec![],
            },
            Attributes {
                rarity: 2,
                weight: 20,
                tags: vec!["red".to_string(), "blue".to_string()],
            },
        ],
        owner: [0x44; 32],
        total_supply: u128::MAX,
        score,
        price: 0,
        rule: false,
        metadata: vec![
            Entry {
                key: "hp".to_string(),
                value: 100,
            },
            Entry {
                key: "armor".to_string(),
                value: 42,
            },
        ],
        icon: "https://anima.nexus/helm.png".to_string(),
        discount: Some(15),
    }
}

#[tokio::test]
async fn builder_decodes_identically_from_every_source() {
    let registry = registry();
    let bytes = bcs::to_bytes(&sample_builder()).unwrap();
    let id = format!("0x{}", "33".repeat(32));
    let client = MockObjectClient::new().with_object(RemoteObject {
        object_id: id.clone(),
        type_string: Some(format!("{}::genesis_shop::Builder<0x2::sui::SUI>", PKG)),
        bcs_bytes: Some(bytes.clone()),
        content: None,
    });
    let decoder = StructDecoder::new(registry.clone()).with_client(Arc::new(client));
    let ty = registry
        .reify_str(&format!("{}::genesis_shop::Builder<0x2::sui::SUI>", PKG))
        .unwrap();

    let from_bcs = decoder.decode(&ty, &SourceEncoding::Binary(bytes.clone())).await.unwrap();
    let json = to_json(&from_bcs);
    let from_json = decoder.decode(&ty, &SourceEncoding::Json(json.clone())).await.unwrap();
    let from_remote = decoder.decode(&ty, &SourceEncoding::RemoteReference(id)).await.unwrap();

    assert_eq!(from_bcs, from_json);
    assert_eq!(from_bcs, from_remote);
    assert_eq!(to_bcs(&from_json).unwrap(), bytes);

    assert_eq!(json["$typeArgs"], json!(["0x2::sui::SUI"]));
    assert_eq!(json["itemsAdded"], json!("2833"));
    assert_eq!(json["totalSupply"], json!(u128::MAX.to_string()));
    assert_eq!(json["score"], json!("7"));
    assert_eq!(json["manufacturer"], json!(null));
    assert_eq!(json["discount"], json!(15));
    assert_eq!(json["metadata"]["contents"][1]["key"], json!("armor"));
}

#[test]
fn item_matches_typed_fields() {
    let registry = registry();
    let decoder = StructDecoder::new(registry.clone());
    let ty = registry.reify_str(&format!("{}::item::Item", PKG)).unwrap();

    let item = Item {
        id: Uid { id: [0x01; 32] },
        level: 3,
        power: 900,
        name: "Ember Helm".to_string(),
    };
    let from_bcs = decoder.from_bcs(&ty, &bcs::to_bytes(&item).unwrap()).unwrap();

    let fields = serde_json::from_value(json!({
        "type": format!("{}::item::Item", PKG),
        "fields": {
            "id": { "id": format!("0x{}", "01".repeat(32)) },
            "level": "3",
            "power": 900,
            "name": "Ember Helm"
        }
    }))
    .unwrap();
    let from_fields = decoder.from_fields_with_types(&ty, &fields).unwrap();
    assert_eq!(from_bcs, from_fields);
}

#[test]
fn invalid_utf8_string_is_rejected() {
    let registry = registry();
    let decoder = StructDecoder::new(registry.clone());
    let ty = registry.reify_str(&format!("{}::item::Item", PKG)).unwrap();

    #[derive(Serialize)]
    struct RawItem {
        id: Uid,
        level: u64,
        power: u32,
        name: Vec<u8>,
    }
    let raw = RawItem {
        id: Uid { id: [0x01; 32] },
        level: 1,
        power: 1,
        name: vec![0xff, 0xfe],
    };
    let err = decoder.from_bcs(&ty, &bcs::to_bytes(&raw).unwrap()).unwrap_err();
    assert!(matches!(err, ReifiedError::Decode(_)), "{:?}", err);
}

#[test]
fn trailing_bytes_are_rejected() {
    let registry = registry();
    let decoder = StructDecoder::new(registry.clone());
    let ty = registry.reify_str(&format!("{}::item::Item", PKG)).unwrap();

    let mut bytes = bcs::to_bytes(&Item {
        id: Uid { id: [0x01; 32] },
        level: 1,
        power: 1,
        name: "x".to_string(),
    })
    .unwrap();
    bytes.push(0);
    assert!(matches!(decoder.from_bcs(&ty, &bytes), Err(ReifiedError::Decode(_))));
}
