use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use rand::Rng;

use crate::config::{STAR_COUNT, STAR_EXTENT};

// background tag
#[derive(Component)]
pub struct Starfield;

/// Uniform points in the cube [-extent, extent]^3
pub fn generate_stars<R: Rng>(rng: &mut R, count: usize, extent: f32) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.random_range(-extent..=extent),
                rng.random_range(-extent..=extent),
                rng.random_range(-extent..=extent),
            )
        })
        .collect()
}

// point cloud mesh, one vertex per star, no indices
pub fn create_point_cloud_mesh(points: &[Vec3]) -> Mesh {
    let positions: Vec<[f32; 3]> = points.iter().map(|p| p.to_array()).collect();

    Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
}

/// Default-sized starfield mesh, ready to be added to `Assets<Mesh>`
pub fn starfield_mesh<R: Rng>(rng: &mut R) -> Mesh {
    create_point_cloud_mesh(&generate_stars(rng, STAR_COUNT, STAR_EXTENT))
}

pub fn starfield_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::WHITE,
        unlit: true, // stars ignore the light rig
        ..default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::render::mesh::VertexAttributeValues;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_stars_within_extent() {
        let mut rng = StdRng::seed_from_u64(42);
        let stars = generate_stars(&mut rng, STAR_COUNT, STAR_EXTENT);

        assert_eq!(stars.len(), 1000);
        assert!(stars.iter().all(|s| {
            s.x.abs() <= STAR_EXTENT && s.y.abs() <= STAR_EXTENT && s.z.abs() <= STAR_EXTENT
        }));
    }

    #[test]
    fn test_stars_spread_over_every_axis() {
        let mut rng = StdRng::seed_from_u64(9);
        let stars = generate_stars(&mut rng, STAR_COUNT, STAR_EXTENT);

        // roughly half of a uniform sample lands on each side of every axis
        for axis in 0..3 {
            let positive = stars.iter().filter(|s| s[axis] > 0.0).count();
            assert!((350..=650).contains(&positive), "axis {axis}: {positive}");
        }
    }

    #[test]
    fn test_same_seed_same_sky() {
        let a = generate_stars(&mut StdRng::seed_from_u64(1), 16, 10.0);
        let b = generate_stars(&mut StdRng::seed_from_u64(1), 16, 10.0);
        let c = generate_stars(&mut StdRng::seed_from_u64(2), 16, 10.0);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_point_cloud_mesh() {
        let mut rng = StdRng::seed_from_u64(3);
        let mesh = starfield_mesh(&mut rng);

        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::PointList);
        assert!(mesh.indices().is_none());
        match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
            Some(VertexAttributeValues::Float32x3(positions)) => assert_eq!(positions.len(), STAR_COUNT),
            other => panic!("unexpected position attribute: {other:?}"),
        }
    }
}
