//! Closest-first implementation search tests
//!
//! Two product assemblies each ship their own `Notifier`. Whichever type asks
//! for a notifier gets the one declared closest to it, from a single container.

use autowire_di::{Container, ContainerConfig, DiError, DiErrorKind, ResolutionContext, resolve};
use autowire_types::{ConstructorSpec, Lifetime, TypeRegistry};
use rstest::rstest;
use std::sync::Arc;

trait Notifier: Send + Sync + std::fmt::Debug {
	fn channel(&self) -> &'static str;
}

#[derive(Debug, Default)]
struct BillingNotifier;
#[derive(Debug, Default)]
struct ShippingNotifier;
#[derive(Debug, Default)]
struct EmailNotifier;
#[derive(Debug, Default)]
struct SmsNotifier;

impl Notifier for BillingNotifier {
	fn channel(&self) -> &'static str {
		"billing"
	}
}

impl Notifier for ShippingNotifier {
	fn channel(&self) -> &'static str {
		"shipping"
	}
}

impl Notifier for EmailNotifier {
	fn channel(&self) -> &'static str {
		"email"
	}
}

impl Notifier for SmsNotifier {
	fn channel(&self) -> &'static str {
		"sms"
	}
}

struct InvoiceService {
	notifier: Arc<dyn Notifier>,
}

struct DispatchService {
	notifier: Arc<dyn Notifier>,
}

struct ReportService {
	notifier: Arc<dyn Notifier>,
}

fn as_notifier<T: Notifier + 'static>(concrete: Arc<T>) -> Arc<dyn Notifier> {
	concrete
}

fn products() -> TypeRegistry {
	TypeRegistry::builder()
		.assembly("core", |asm| {
			asm.in_namespace("core").interface::<dyn Notifier, _>(|_| {});
		})
		.assembly("billing", |asm| {
			asm.references(["core"])
				.in_namespace("billing::notify")
				.concrete::<BillingNotifier, _>(|ty| {
					ty.implements::<dyn Notifier, _>(as_notifier)
						.constructor(ConstructorSpec::default_public());
				})
				.in_namespace("billing::invoices")
				.concrete::<InvoiceService, _>(|ty| {
					ty.constructor(
						ConstructorSpec::public(|a| {
							Ok(InvoiceService {
								notifier: a.take()?,
							})
						})
						.param::<dyn Notifier>(),
					);
				});
		})
		.assembly("shipping", |asm| {
			asm.references(["core", "legacy_carrier"])
				.in_namespace("shipping")
				.concrete::<ShippingNotifier, _>(|ty| {
					ty.implements::<dyn Notifier, _>(as_notifier)
						.constructor(ConstructorSpec::default_public());
				})
				.concrete::<DispatchService, _>(|ty| {
					ty.constructor(
						ConstructorSpec::public(|a| {
							Ok(DispatchService {
								notifier: a.take()?,
							})
						})
						.param::<dyn Notifier>(),
					);
				});
		})
		.assembly("reporting", |asm| {
			asm.references(["legacy_carrier", "billing"])
				.in_namespace("reporting")
				.broken_type("reporting::Chart", "could not load dependency plotters")
				.concrete::<ReportService, _>(|ty| {
					ty.lifetime(Lifetime::Transient).constructor(
						ConstructorSpec::public(|a| {
							Ok(ReportService {
								notifier: a.take()?,
							})
						})
						.param::<dyn Notifier>(),
					);
				});
		})
		.unloadable_assembly("legacy_carrier", "image format not recognised")
		.build()
}

#[rstest]
fn test_each_requester_gets_its_own_assembly_implementation() {
	// Arrange
	let container = Container::with_registry(products());

	// Act
	let invoices = container.resolve::<InvoiceService>().unwrap();
	let dispatch = container.resolve::<DispatchService>().unwrap();

	// Assert
	assert_eq!(invoices.notifier.channel(), "billing");
	assert_eq!(dispatch.notifier.channel(), "shipping");
}

#[rstest]
fn test_referenced_assembly_is_second_tier() {
	// Arrange
	let container = Container::with_registry(products());

	// Act
	let report = container.resolve::<ReportService>().unwrap();

	// Assert
	assert_eq!(report.notifier.channel(), "billing");
}

#[rstest]
fn test_shared_singleton_implementation() {
	// Arrange
	let container = Container::with_registry(products());

	// Act
	let direct = container.resolve_for::<dyn Notifier, InvoiceService>().unwrap();
	let through_service = container.resolve::<InvoiceService>().unwrap();

	// Assert
	assert!(Arc::ptr_eq(&direct, &through_service.notifier));
}

#[rstest]
fn test_no_context_sees_every_assembly() {
	// Arrange
	let container = Container::with_registry(products());

	// Act
	let error = container.resolve::<dyn Notifier>().unwrap_err();

	// Assert
	match error {
		DiError::AmbiguousImplementation { candidates, .. } => {
			assert_eq!(
				candidates,
				vec!["billing::notify::BillingNotifier", "shipping::ShippingNotifier"]
			);
		}
		other => panic!("Expected AmbiguousImplementation, got {other:?}"),
	}
}

#[rstest]
fn test_entry_assembly_for_contextless_calls() {
	// Arrange
	let container = Container::builder(products())
		.entry_assembly("shipping")
		.build();

	// Act
	let notifier = container.resolve::<dyn Notifier>().unwrap();

	// Assert
	assert_eq!(notifier.channel(), "shipping");
}

#[rstest]
fn test_location_context() {
	// Arrange
	let container = Container::with_registry(products());

	// Act
	let notifier = container
		.resolve_with::<dyn Notifier>(ResolutionContext::at("billing", "billing::api"))
		.unwrap();

	// Assert
	assert_eq!(notifier.channel(), "billing");
}

#[rstest]
fn test_resolve_macro_uses_calling_crate() {
	// Arrange
	let container = Container::builder(products())
		.entry_assembly("billing")
		.build();

	// Act
	// This crate is not a registered assembly: every loaded one is searched
	// and the module path picks the closest namespace
	let notifier = resolve!(container, dyn Notifier).unwrap();

	// Assert
	assert_eq!(notifier.channel(), "shipping");
}

fn same_assembly(config: ContainerConfig) -> Container {
	Container::builder(
		TypeRegistry::builder()
			.assembly("alerts", |asm| {
				asm.in_namespace("alerts::email")
					.concrete::<EmailNotifier, _>(|ty| {
						ty.implements::<dyn Notifier, _>(as_notifier)
							.constructor(ConstructorSpec::default_public());
					})
					.in_namespace("alerts::sms")
					.concrete::<SmsNotifier, _>(|ty| {
						ty.implements::<dyn Notifier, _>(as_notifier)
							.constructor(ConstructorSpec::default_public());
					});
			})
			.build(),
	)
	.config(config)
	.build()
}

#[rstest]
#[case("alerts::email::templates", "email")]
#[case("alerts::sms", "sms")]
fn test_namespace_tie_break(#[case] namespace: &str, #[case] expected: &str) {
	// Arrange
	let container = same_assembly(ContainerConfig::default());

	// Act
	let notifier = container
		.resolve_with::<dyn Notifier>(ResolutionContext::at("alerts", namespace))
		.unwrap();

	// Assert
	assert_eq!(notifier.channel(), expected);
}

#[rstest]
fn test_equal_distance_lists_both_candidates() {
	// Arrange
	let container = same_assembly(ContainerConfig::default());

	// Act
	let error = container
		.resolve_with::<dyn Notifier>(ResolutionContext::at("alerts", "alerts::push"))
		.unwrap_err();

	// Assert
	let message = error.to_string();
	assert_eq!(error.kind(), DiErrorKind::AmbiguousImplementation);
	assert!(message.contains("alerts::email::EmailNotifier"));
	assert!(message.contains("alerts::sms::SmsNotifier"));
}

#[rstest]
fn test_tie_break_disabled_by_config() {
	// Arrange
	let config = ContainerConfig::from_toml_str("namespace_tie_break = false").unwrap();
	let container = same_assembly(config);

	// Act
	let result =
		container.resolve_with::<dyn Notifier>(ResolutionContext::at("alerts", "alerts::sms"));

	// Assert
	assert!(matches!(result, Err(DiError::AmbiguousImplementation { .. })));
}

#[rstest]
fn test_missing_implementation_explains_search() {
	// Arrange
	trait Archiver: Send + Sync + std::fmt::Debug {}
	let container = Container::with_registry(products());

	// Act
	let error = container
		.resolve_for::<dyn Archiver, InvoiceService>()
		.unwrap_err();

	// Assert
	assert_eq!(error.kind(), DiErrorKind::NoImplementationFound);
	assert!(error.to_string().contains("Archiver"));
	assert!(error.to_string().contains("references"));
}
