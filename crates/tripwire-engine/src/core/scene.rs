use crate::api::types::EntityId;
use crate::components::entity::Entity;

/// Every entity of a level, in spawn order.
///
/// Lookups are linear; a level holds tens of entities, not thousands.
/// Spawn order is preserved across despawns so that tag lookups keep
/// resolving to the earliest entity with that tag.
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(32),
        }
    }

    /// Add an entity and return its id.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    /// Remove an entity, handing it back so the caller can release its body.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.index_of(id)?;
        Some(self.entities.remove(idx))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Earliest-spawned entity carrying `tag`.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag == tag)
    }

    pub fn id_by_tag(&self, tag: &str) -> Option<EntityId> {
        self.find_by_tag(tag).map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn spawn_and_get() {
        let mut scene = Scene::new();
        let id = scene.spawn(Entity::new(EntityId(1)).with_pos(Vec2::new(10.0, 20.0)));
        assert_eq!(id, EntityId(1));
        assert!(scene.contains(id));
        assert_eq!(scene.get(id).unwrap().pos, Vec2::new(10.0, 20.0));

        scene.get_mut(id).unwrap().pos = Vec2::ZERO;
        assert_eq!(scene.get(id).unwrap().pos, Vec2::ZERO);
    }

    #[test]
    fn despawn_removes_entity() {
        let mut scene = Scene::new();
        let id = scene.spawn(Entity::new(EntityId(1)));
        assert!(scene.despawn(id).is_some());
        assert!(scene.is_empty());
        assert!(!scene.contains(id));
        assert!(scene.despawn(id).is_none());
    }

    #[test]
    fn tags_resolve_to_earliest_spawn() {
        let mut scene = Scene::new();
        scene.spawn(Entity::new(EntityId(1)).with_tag("Player"));
        scene.spawn(Entity::new(EntityId(2)).with_tag("Anchor"));
        scene.spawn(Entity::new(EntityId(3)).with_tag("Player"));
        scene.spawn(Entity::new(EntityId(4)).with_tag("Player"));
        assert_eq!(scene.id_by_tag("Player"), Some(EntityId(1)));
        assert_eq!(scene.id_by_tag("Missing"), None);

        // Despawning the first match falls through to the next one in spawn order.
        scene.despawn(EntityId(1));
        assert_eq!(scene.id_by_tag("Player"), Some(EntityId(3)));
        assert_eq!(scene.find_by_tag("Anchor").map(|e| e.id), Some(EntityId(2)));
    }
}
