use gantry_core::components::{DetachableJoint, Link, Model, Name, ParentEntity};
use gantry_core::config::{Config, Element};
use gantry_core::ecs::{Entity, EntityComponentManager, Filter};
use gantry_core::event::LoadPlugins;
use gantry_core::system::SystemState;
use gantry_core::systems::detachable_joint::SELF_MODEL;
use gantry_core::transport::Empty;
use gantry_core::Simulation;

fn spawn(ecm: &mut EntityComponentManager, parent: Entity, name: &str) -> Entity {
    let entity = ecm.create_entity();
    ecm.create_component(entity, Name::new(name)).unwrap();
    if !parent.is_null() {
        ecm.create_component(entity, ParentEntity(parent)).unwrap();
    }
    entity
}

fn spawn_model(ecm: &mut EntityComponentManager, name: &str, link: &str) -> (Entity, Entity) {
    let model = spawn(ecm, Entity::NULL, name);
    ecm.create_component(model, Model).unwrap();
    let link_entity = spawn(ecm, model, link);
    ecm.create_component(link_entity, Link).unwrap();
    (model, link_entity)
}

fn plugin(child_model: &str, child_link: &str) -> Element {
    Element::new("plugin")
        .with_attribute("name", "detachable_joint")
        .with_text("parent_link", "base")
        .with_text("child_model", child_model)
        .with_text("child_link", child_link)
}

fn joints(simulation: &Simulation) -> Vec<Entity> {
    simulation
        .ecm()
        .entities_by_components(&[Filter::has::<DetachableJoint>()])
}

#[test]
fn test_detach_through_transport() {
    let mut simulation = Simulation::new(Config::default()).unwrap();
    let ecm = simulation.ecm_mut();
    let (model, base) = spawn_model(ecm, "M1", "base");
    let tip = spawn(ecm, model, "tip");
    ecm.create_component(tip, Link).unwrap();

    let element = Element::new("model").with_child(plugin(SELF_MODEL, "tip"));
    simulation.events().emit::<LoadPlugins>(&(model, element));
    simulation.step();

    let joint = match joints(&simulation)[..] {
        [joint] => joint,
        ref other => panic!("expected exactly one joint, got {:?}", other),
    };
    assert_eq!(
        simulation.ecm().component::<DetachableJoint>(joint),
        Some(&DetachableJoint::new(base, tip, "fixed")),
    );

    simulation
        .node()
        .publish("/model/M1/detachable_joint/detach", Empty)
        .unwrap();
    simulation.transport().flush();
    simulation.step();
    assert!(!simulation.ecm().has_entity(joint));
    assert!(joints(&simulation).is_empty());
    assert!(simulation.ecm().has_entity(tip));

    simulation.run(Some(5));
    assert!(joints(&simulation).is_empty());
}

#[test]
fn test_missing_child_model_parameter() {
    let mut simulation = Simulation::new(Config::default()).unwrap();
    let (model, _) = spawn_model(simulation.ecm_mut(), "M1", "base");

    let element = Element::new("plugin")
        .with_attribute("name", "detachable_joint")
        .with_text("parent_link", "base")
        .with_text("child_link", "tip");
    simulation.load_plugins(model, &element);
    simulation.run(Some(3));

    assert!(joints(&simulation).is_empty());
    let states: Vec<_> = simulation.systems().states().map(|(_, _, state)| state).collect();
    assert_eq!(states, vec![SystemState::Active]);
}

#[test]
fn test_child_model_created_later() {
    let mut simulation = Simulation::new(Config::default()).unwrap();
    let (model, _) = spawn_model(simulation.ecm_mut(), "M1", "base");
    simulation.load_plugins(model, &plugin("cargo", "body"));

    simulation.step();
    assert!(joints(&simulation).is_empty());

    let (_, body) = spawn_model(simulation.ecm_mut(), "cargo", "body");
    simulation.run(Some(3));
    let found = joints(&simulation);
    assert_eq!(found.len(), 1);
    let joint = simulation.ecm().component::<DetachableJoint>(found[0]).unwrap();
    assert_eq!(joint.child_link, body);
}

#[test]
fn test_removed_model_drops_its_systems() {
    let mut simulation = Simulation::new(Config::default()).unwrap();
    let (model, _) = spawn_model(simulation.ecm_mut(), "M1", "base");
    spawn_model(simulation.ecm_mut(), "cargo", "body");
    simulation.load_plugins(model, &plugin("cargo", "body"));
    simulation.step();
    assert_eq!(simulation.systems().len(), 1);

    simulation.ecm_mut().request_remove_entity(model, true);
    // still readable until the purge point
    assert!(simulation.ecm().has_entity(model));
    simulation.step();

    assert!(!simulation.ecm().has_entity(model));
    assert!(simulation.systems().is_empty());
    assert_eq!(
        simulation
            .ecm()
            .entity_by_components(&[Filter::has::<Model>(), Filter::eq(Name::new("M1"))]),
        Entity::NULL,
    );
}
