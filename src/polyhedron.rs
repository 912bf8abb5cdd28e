use crate::state::ModelId;
use glam::{DVec2, DVec3};
use std::f64::consts::PI;

/// Read-only geometry consumed by the render pipeline
///
/// Every index in every face must be a valid index into `vertices()`.
pub trait Geometry {
    fn vertices(&self) -> &[DVec3];
    /// Vertex index loops, one per convex planar face
    fn faces(&self) -> &[Vec<usize>];
    /// Distance from the origin to the farthest vertex
    fn bounding_radius(&self) -> f64;
}

/// An indexed face set
#[derive(Debug, Clone, PartialEq)]
pub struct Polyhedron {
    vertices: Vec<DVec3>,
    faces: Vec<Vec<usize>>,
    bounding_radius: f64,
}

impl Polyhedron {
    pub fn new(vertices: Vec<DVec3>, faces: Vec<Vec<usize>>) -> Self {
        let bounding_radius = vertices
            .iter()
            .map(|v| v.length())
            .fold(0.0, f64::max);
        Polyhedron {
            vertices,
            faces,
            bounding_radius,
        }
    }

    /// Builds one of the named models
    pub fn model(id: ModelId) -> Self {
        match id {
            ModelId::Octocone => octocone(),
            ModelId::Dome => dome(),
            ModelId::SquareDonut => square_donut(),
            ModelId::Hourglass => hourglass(),
            ModelId::LetterX => letter_x(),
            ModelId::LetterV => letter_v(),
        }
    }
}

impl Geometry for Polyhedron {
    fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    fn bounding_radius(&self) -> f64 {
        self.bounding_radius
    }
}

/// All named models, built once at startup
pub struct ModelLibrary {
    models: Vec<Polyhedron>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        ModelLibrary {
            models: ModelId::ALL.iter().map(|&id| Polyhedron::model(id)).collect(),
        }
    }

    pub fn get(&self, id: ModelId) -> &Polyhedron {
        let index = ModelId::ALL
            .iter()
            .position(|&candidate| candidate == id)
            .unwrap_or(0);
        &self.models[index]
    }
}

impl Default for ModelLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates vertices and faces from several parts
#[derive(Default)]
struct Builder {
    vertices: Vec<DVec3>,
    faces: Vec<Vec<usize>>,
}

impl Builder {
    fn add_vertex(&mut self, v: DVec3) -> usize {
        self.vertices.push(v);
        self.vertices.len() - 1
    }

    /// Surface of revolution around the Y axis.
    ///
    /// `profile` lists `(radius, y)` rings from top to bottom; a ring with
    /// zero radius collapses to a single pole vertex. Rings with a radius at
    /// either end are closed with a flat cap.
    fn lathe(&mut self, profile: &[(f64, f64)], segments: usize, phase: f64) {
        let rings: Vec<Vec<usize>> = profile
            .iter()
            .map(|&(radius, y)| {
                if radius == 0.0 {
                    vec![self.add_vertex(DVec3::new(0.0, y, 0.0))]
                } else {
                    (0..segments)
                        .map(|k| {
                            let angle = phase + 2.0 * PI * k as f64 / segments as f64;
                            self.add_vertex(DVec3::new(
                                radius * angle.cos(),
                                y,
                                -radius * angle.sin(),
                            ))
                        })
                        .collect()
                }
            })
            .collect();

        let at = |ring: &Vec<usize>, k: usize| ring[k % ring.len()];
        for pair in rings.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            for k in 0..segments {
                let mut face = vec![at(upper, k)];
                if lower.len() > 1 {
                    face.push(at(lower, k));
                    face.push(at(lower, k + 1));
                } else {
                    face.push(at(lower, 0));
                }
                if upper.len() > 1 {
                    face.push(at(upper, k + 1));
                }
                face.dedup();
                if face.len() >= 3 {
                    self.faces.push(face);
                }
            }
        }

        if let Some(top) = rings.first().filter(|ring| ring.len() > 1) {
            self.faces.push(top.clone());
        }
        if let Some(bottom) = rings.last().filter(|ring| ring.len() > 1) {
            self.faces.push(bottom.iter().rev().copied().collect());
        }
    }

    /// Extrudes a convex counter-clockwise outline in the XY plane between
    /// `z = -half_depth` and `z = half_depth`.
    fn prism(&mut self, outline: &[DVec2], half_depth: f64) {
        let n = outline.len();
        let front: Vec<usize> = outline
            .iter()
            .map(|p| self.add_vertex(p.extend(half_depth)))
            .collect();
        let back: Vec<usize> = outline
            .iter()
            .map(|p| self.add_vertex(p.extend(-half_depth)))
            .collect();

        self.faces.push(front.clone());
        self.faces.push(back.iter().rev().copied().collect());
        for i in 0..n {
            let j = (i + 1) % n;
            self.faces.push(vec![front[i], back[i], back[j], front[j]]);
        }
    }

    /// A straight bar of the given half width from `from` to `to`.
    fn bar(&mut self, from: DVec2, to: DVec2, half_width: f64, half_depth: f64) {
        let normal = (to - from).perp().normalize() * half_width;
        self.prism(
            &[from - normal, to - normal, to + normal, from + normal],
            half_depth,
        );
    }

    fn build(self) -> Polyhedron {
        Polyhedron::new(self.vertices, self.faces)
    }
}

fn octocone() -> Polyhedron {
    let mut builder = Builder::default();
    builder.lathe(&[(0.0, 1.0), (1.0, -1.0)], 8, 0.0);
    builder.build()
}

fn dome() -> Polyhedron {
    let profile: Vec<(f64, f64)> = (0..=4)
        .map(|i| {
            let polar = (i as f64 / 4.0) * PI / 2.0;
            (polar.sin(), polar.cos())
        })
        .collect();
    let mut builder = Builder::default();
    builder.lathe(&profile, 12, 0.0);
    builder.build()
}

fn hourglass() -> Polyhedron {
    let mut builder = Builder::default();
    builder.lathe(&[(1.0, 1.0), (0.25, 0.0), (1.0, -1.0)], 4, PI / 4.0);
    builder.build()
}

fn square_donut() -> Polyhedron {
    let (outer, inner, half_depth) = (1.0, 0.5, 0.25);
    let mut builder = Builder::default();
    // one trapezoidal prism per side of the frame
    let corners = [
        DVec2::new(1.0, 1.0),
        DVec2::new(-1.0, 1.0),
        DVec2::new(-1.0, -1.0),
        DVec2::new(1.0, -1.0),
    ];
    for i in 0..4 {
        let (a, b) = (corners[i], corners[(i + 1) % 4]);
        builder.prism(&[b * inner, a * inner, a * outer, b * outer], half_depth);
    }
    builder.build()
}

fn letter_x() -> Polyhedron {
    let mut builder = Builder::default();
    builder.bar(DVec2::new(-0.7, -1.0), DVec2::new(0.7, 1.0), 0.15, 0.2);
    builder.bar(DVec2::new(0.7, -1.0), DVec2::new(-0.7, 1.0), 0.15, 0.2);
    builder.build()
}

fn letter_v() -> Polyhedron {
    let mut builder = Builder::default();
    builder.bar(DVec2::new(0.0, -1.0), DVec2::new(-0.7, 1.0), 0.15, 0.2);
    builder.bar(DVec2::new(0.7, 1.0), DVec2::new(0.0, -1.0), 0.15, 0.2);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_face_index_is_valid() {
        for id in ModelId::ALL {
            let model = Polyhedron::model(id);
            assert!(!model.faces().is_empty(), "{id} has no faces");
            for face in model.faces() {
                assert!(face.len() >= 3, "{id} has a degenerate face");
                for &index in face {
                    assert!(index < model.vertices().len(), "{id} index {index}");
                }
            }
        }
    }

    #[test]
    fn bounding_radius_covers_every_vertex() {
        for id in ModelId::ALL {
            let model = Polyhedron::model(id);
            assert!(model.bounding_radius() > 0.0);
            for v in model.vertices() {
                assert!(v.length() <= model.bounding_radius() + 1e-12);
            }
        }
    }

    #[test]
    fn octocone_shape() {
        let model = Polyhedron::model(ModelId::Octocone);
        // apex plus eight base vertices
        assert_eq!(model.vertices().len(), 9);
        // eight sides plus the base
        assert_eq!(model.faces().len(), 9);
        assert!((model.bounding_radius() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn faces_are_planar() {
        for id in ModelId::ALL {
            let model = Polyhedron::model(id);
            for face in model.faces() {
                let p: Vec<DVec3> = face.iter().map(|&i| model.vertices()[i]).collect();
                let normal = (p[1] - p[0]).cross(p[2] - p[0]);
                for q in &p[3..] {
                    assert!(normal.dot(*q - p[0]).abs() < 1e-9, "{id} face not planar");
                }
            }
        }
    }

    #[test]
    fn library_returns_requested_model() {
        let library = ModelLibrary::new();
        assert_eq!(
            library.get(ModelId::SquareDonut),
            &Polyhedron::model(ModelId::SquareDonut)
        );
    }
}
