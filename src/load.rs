use std::{fs, io::BufReader, path::Path};

use glium::implement_vertex;
use tracing::debug;

use crate::error::{Result, ViewerError};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ObjVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub texture: [f32; 2],
}

implement_vertex!(ObjVertex, position, normal, texture);

/// Triangle-list geometry ready for upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ObjVertex>,
    pub indices: Vec<u32>,
}

/// Flattens every polygon of every group into a triangle list. Polygons with
/// more than three corners are fanned from their first corner. Missing normals
/// and texture coordinates are zeroed.
pub fn to_mesh_data(data: &obj::ObjData, path: &Path) -> Result<MeshData> {
    let lookup = |index: usize, len: usize| {
        if index < len {
            Ok(index)
        } else {
            Err(ViewerError::ObjIndex {
                path: path.to_owned(),
                index,
                count: len,
            })
        }
    };

    let mut mesh = MeshData::default();
    let polys = data
        .objects
        .iter()
        .flat_map(|object| object.groups.iter().flat_map(|g| g.polys.iter()));

    for obj::SimplePolygon(corners) in polys {
        if corners.len() < 3 {
            continue;
        }
        let base = u32::try_from(mesh.vertices.len()).map_err(|_| ViewerError::ObjIndex {
            path: path.to_owned(),
            index: mesh.vertices.len(),
            count: u32::MAX as usize,
        })?;

        for obj::IndexTuple(p, t, n) in corners {
            let position = data.position[lookup(*p, data.position.len())?];
            let texture = match t {
                Some(t) => data.texture[lookup(*t, data.texture.len())?],
                None => [0.0; 2],
            };
            let normal = match n {
                Some(n) => data.normal[lookup(*n, data.normal.len())?],
                None => [0.0; 3],
            };
            mesh.vertices.push(ObjVertex {
                position,
                normal,
                texture,
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let corner_count = corners.len() as u32;
        mesh.indices
            .extend((1..corner_count - 1).flat_map(|i| [base, base + i, base + i + 1]));
    }

    Ok(mesh)
}

/// Parse the byte stream from the obj file to an `ObjData` result
pub fn get_objdata(data: &[u8]) -> std::result::Result<obj::ObjData, obj::ObjError> {
    obj::ObjData::load_buf(BufReader::new(data))
}

/// Reads and flattens a model file.
pub fn load_obj(path: &Path) -> Result<MeshData> {
    let bytes = fs::read(path).map_err(|source| ViewerError::ObjRead {
        path: path.to_owned(),
        source,
    })?;
    let data = get_objdata(&bytes).map_err(|source| ViewerError::ObjParse {
        path: path.to_owned(),
        source,
    })?;
    let mesh = to_mesh_data(&data, path)?;
    debug!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        triangles = mesh.indices.len() / 3,
        "loaded model"
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const QUAD: &str = "\
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
vn 0 1 0
vt 0 0
f 1/1/1 2/1/1 3/1/1 4/1/1
";

    #[test]
    fn quads_are_fanned_into_triangles() {
        let data = get_objdata(QUAD.as_bytes()).unwrap();
        let mesh = to_mesh_data(&data, Path::new("quad.obj")).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        assert_eq!(mesh.vertices[2].position, [1.0, 0.0, 1.0]);
    }

    #[test]
    fn missing_attributes_are_zeroed() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let data = get_objdata(src.as_bytes()).unwrap();
        let mesh = to_mesh_data(&data, Path::new("tri.obj")).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices[1].normal, [0.0; 3]);
        assert_eq!(mesh.vertices[1].texture, [0.0; 2]);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        file.write_all(QUAD.as_bytes()).unwrap();
        let mesh = load_obj(file.path()).unwrap();
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_obj(Path::new("/nonexistent/pawn.obj")).unwrap_err();
        assert!(matches!(err, ViewerError::ObjRead { .. }));
        assert!(err.to_string().contains("pawn.obj"));
    }
}
