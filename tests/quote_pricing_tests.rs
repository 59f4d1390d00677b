use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use transport_pricing::config::CarrierConfig;
use transport_pricing::error::AppError;
use transport_pricing::pricing::{
    CarrierClient, Catalog, Location, PricingEngine, QuoteRequest, TenantDirectory, Tier,
    TrailerType, Vehicle,
};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const CATALOG: &str = r#"
[global]
inoperable = { value = 500 }
enclosed_flat = { value = 300 }

[global.oversize]
suv = 150
van = 200
default = 100

[[global.service_levels]]
tier = 1
value = 400

[[global.service_levels]]
tier = 3
value = 200

[[global.service_levels]]
tier = 5
value = 100

[[global.service_levels]]
tier = 7
value = 0

[[tenants]]
id = "acme"
name = "Acme Auto Transport"

[tenants.modifiers]
company_tariff = { value = 10, kind = "percentage" }
portal_wide_commission = { value = 25 }

[[tenants]]
id = "jk-motors"
rate_source = "jk"

[tenants.jk]
enclosed_up_to_1500 = 250
enclosed_over_1500 = 400

[tenants.jk.surcharges]
suv = 200

[tenants.jk.rates]
"751-1000" = 10000

[[vehicles]]
make = "Toyota"
model = "RAV4"
class = "suv"
"#;

async fn carrier_mock(price: Decimal) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/price-prediction"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "price": price })),
        )
        .mount(&server)
        .await;
    server
}

fn engine(catalog: Arc<Catalog>, carrier_url: &str) -> PricingEngine {
    let carrier = CarrierClient::new(CarrierConfig {
        base_url: carrier_url.to_string(),
        api_key: None,
        timeout_seconds: 5,
    })
    .unwrap();
    PricingEngine::new(catalog.clone(), catalog, Arc::new(carrier))
        .with_lookup_timeout(Duration::from_secs(5))
}

fn request(vehicles: Vec<Vehicle>) -> QuoteRequest {
    QuoteRequest {
        vehicles,
        miles: dec!(900),
        origin: Location {
            city: "Denver".into(),
            state: "CO".into(),
            zip: None,
        },
        destination: Location {
            city: "Austin".into(),
            state: "TX".into(),
            zip: None,
        },
        commission: dec!(50),
    }
}

#[tokio::test]
async fn test_standard_quote_against_carrier() {
    let server = carrier_mock(dec!(1000)).await;
    let catalog = Arc::new(Catalog::from_toml_str(CATALOG).unwrap());
    let tenant = catalog.find_tenant("acme").await.unwrap().unwrap();

    let mut broken = Vehicle::new("Honda", "Civic");
    broken.is_inoperable = true;

    let result = engine(catalog, &server.uri())
        .price(&tenant, &request(vec![Vehicle::new("Toyota", "RAV4"), broken]))
        .await
        .unwrap();

    assert_eq!(result.strategy, "standard");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);

    let suv = result.vehicle_pricings[0].pricing.as_ref().unwrap();
    // Oversize is itemized but stays out of the totals
    assert_eq!(suv.modifiers.oversize, dec!(150));
    assert_eq!(suv.totals.seven.open.total, dec!(1000));
    assert_eq!(suv.totals.one.open.total, dec!(1400));
    assert_eq!(suv.totals.one.enclosed.total, dec!(1700));
    // 10% company tariff on the modified base, commission 50 + 25
    assert_eq!(suv.totals.one.open.company_tariff, dec!(140));
    assert_eq!(suv.totals.one.open.commission, dec!(75));
    assert_eq!(suv.totals.white_glove, dec!(1800));

    let sedan = result.vehicle_pricings[1].pricing.as_ref().unwrap();
    assert_eq!(sedan.modifiers.inoperable, dec!(500));
    assert_eq!(sedan.modifiers.oversize, dec!(0));
    assert_eq!(sedan.totals.seven.open.total, dec!(1500));

    let totals = &result.quote_total_pricing.totals;
    for tier in Tier::ALL {
        for trailer in TrailerType::ALL {
            let expected = suv.totals.leaf(tier, trailer).total + sedan.totals.leaf(tier, trailer).total;
            assert_eq!(totals.leaf(tier, trailer).total, expected);
        }
    }
    assert_eq!(
        result.quote_total_pricing.modifiers.service_levels[0].value,
        dec!(800)
    );
}

#[tokio::test]
async fn test_jk_quote_skips_carrier() {
    let server = carrier_mock(dec!(1000)).await;
    let catalog = Arc::new(Catalog::from_toml_str(CATALOG).unwrap());
    let tenant = catalog.find_tenant("jk-motors").await.unwrap().unwrap();

    let result = engine(catalog, &server.uri())
        .price(&tenant, &request(vec![Vehicle::new("Honda", "Civic")]))
        .await
        .unwrap();

    assert_eq!(result.strategy, "jk_split");
    assert!(server.received_requests().await.unwrap().is_empty());

    let pricing = result.vehicle_pricings[0].pricing.as_ref().unwrap();
    assert_eq!(pricing.base, dec!(10000));
    for tier in Tier::ALL {
        let leaf = pricing.totals.leaf(tier, TrailerType::Open);
        assert_eq!(leaf.company_tariff, dec!(3000));
        assert_eq!(leaf.total, dec!(7000));
        assert_eq!(pricing.totals.leaf(tier, TrailerType::Enclosed).total, dec!(7250));
    }
}

#[tokio::test]
async fn test_carrier_error_fails_whole_quote() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/price-prediction"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let catalog = Arc::new(Catalog::from_toml_str(CATALOG).unwrap());
    let tenant = catalog.find_tenant("acme").await.unwrap().unwrap();

    let err = engine(catalog, &server.uri())
        .price(&tenant, &request(vec![Vehicle::new("Honda", "Civic")]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UpstreamError { .. }));
    assert!(err.is_rate_lookup_failure());
}

#[tokio::test]
async fn test_slow_carrier_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/price-prediction"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(serde_json::json!({ "price": 900 })),
        )
        .mount(&server)
        .await;

    let catalog = Arc::new(Catalog::from_toml_str(CATALOG).unwrap());
    let tenant = catalog.find_tenant("acme").await.unwrap().unwrap();

    let err = engine(catalog, &server.uri())
        .with_lookup_timeout(Duration::from_millis(50))
        .price(&tenant, &request(vec![Vehicle::new("Honda", "Civic")]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Timeout(_)));
}

#[test]
fn test_demo_files_load() {
    let cfg = transport_pricing::config::load_config("demos/config.toml").unwrap();
    assert_eq!(cfg.catalog.path, "demos/catalog.toml");

    let catalog = Catalog::load(&cfg.catalog.path).unwrap();
    assert_eq!(catalog.tenant_ids(), vec!["acme", "coastline", "jk-motors"]);
    assert_eq!(catalog.vehicle_count(), 4);
    assert!(catalog.tenant("coastline").unwrap().premium);
}
