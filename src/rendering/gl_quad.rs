//! GPU image quad renderer using glow (OpenGL).
//!
//! Draws the decoded image as a single textured quad inside an
//! [`egui::PaintCallback`]. The quad geometry already carries the image's own
//! aspect ratio; `projMatrix` corrects for the viewport shape and
//! `modelMatrix` carries pan and zoom.
//!
//! Matrices are only re-uploaded when the frame policy reported a change.
//! Uniform values live in the program object, so they survive between frames
//! even though egui switches to its own program in between.

use std::sync::{Arc, Mutex};

use glow::HasContext as _;

use crate::config::viewer::TextureFilter;
use crate::core::image::DecodedImage;
use crate::rendering::projection::quad_extent;
use crate::rendering::view::FrameUpload;

// ─── Shader sources ─────────────────────────────────────────────────────

const VERT_SRC: &str = r#"#version 140

in vec3 a_pos;
in vec2 a_uv;
out vec2 v_uv;

uniform mat4 modelMatrix;
uniform mat4 projMatrix;

void main() {
    gl_Position = modelMatrix * projMatrix * vec4(a_pos, 1.0);
    v_uv = a_uv;
}
"#;

const FRAG_SRC: &str = r#"#version 140

in vec2 v_uv;
out vec4 frag_color;

uniform sampler2D u_image;

void main() {
    frag_color = texture(u_image, v_uv);
}
"#;

/// Floats per vertex: position xyz + uv.
const VERTEX_STRIDE: usize = 5;

/// Two triangles sharing the 1–3 diagonal.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Quad vertices as `[x, y, z, u, v]`, clockwise from top-right.
/// `v = 0` is the first (top) image row.
pub fn quad_vertices(image_aspect: f32) -> [f32; 4 * VERTEX_STRIDE] {
    let [hw, hh] = quad_extent(image_aspect);
    #[rustfmt::skip]
    let vertices = [
         hw,  hh, 0.0,  1.0, 0.0,
         hw, -hh, 0.0,  1.0, 1.0,
        -hw, -hh, 0.0,  0.0, 1.0,
        -hw,  hh, 0.0,  0.0, 0.0,
    ];
    vertices
}

// ─── Pending uniform uploads ────────────────────────────────────────────

/// Matrices waiting for the next paint callback.
///
/// A frame whose callback never ran (e.g. the window was minimised) keeps its
/// pending matrices; a newer matrix replaces an older one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PendingUniforms(FrameUpload);

impl PendingUniforms {
    pub fn merge(&mut self, upload: FrameUpload) {
        if upload.model.is_some() {
            self.0.model = upload.model;
        }
        if upload.proj.is_some() {
            self.0.proj = upload.proj;
        }
    }

    pub fn take(&mut self) -> FrameUpload {
        std::mem::take(&mut self.0)
    }
}

// ─── GL resource bundle ─────────────────────────────────────────────────

/// GL objects for the image quad. Created once after the image is decoded,
/// released once in `on_exit`.
pub struct GlQuad {
    program: glow::Program,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    texture: glow::Texture,
    loc_model: Option<glow::UniformLocation>,
    loc_proj: Option<glow::UniformLocation>,
    loc_image: Option<glow::UniformLocation>,
    pending: PendingUniforms,
}

fn compile_shader(gl: &glow::Context, kind: u32, source: &str) -> Result<glow::Shader, String> {
    unsafe {
        let shader = gl.create_shader(kind)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(format!("shader compilation failed:\n{log}"));
        }
        Ok(shader)
    }
}

fn link_program(gl: &glow::Context) -> Result<glow::Program, String> {
    unsafe {
        let vert = compile_shader(gl, glow::VERTEX_SHADER, VERT_SRC)?;
        let frag = match compile_shader(gl, glow::FRAGMENT_SHADER, FRAG_SRC) {
            Ok(frag) => frag,
            Err(error) => {
                gl.delete_shader(vert);
                return Err(error);
            }
        };

        let program = gl.create_program()?;
        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        let linked = gl.get_program_link_status(program);
        gl.detach_shader(program, vert);
        gl.detach_shader(program, frag);
        gl.delete_shader(vert);
        gl.delete_shader(frag);

        if !linked {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(format!("program linking failed:\n{log}"));
        }
        Ok(program)
    }
}

/// Reinterpret a plain numeric slice as bytes for buffer upload.
fn as_bytes<T: Copy>(data: &[T]) -> &[u8] {
    // f32 / u32 have no padding, so every byte is initialised.
    unsafe { core::slice::from_raw_parts(data.as_ptr() as *const u8, core::mem::size_of_val(data)) }
}

fn upload_texture(
    gl: &glow::Context,
    image: &DecodedImage,
    filter: TextureFilter,
) -> Result<glow::Texture, String> {
    unsafe {
        let max_size = gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE);
        if image.width as i64 > max_size as i64 || image.height as i64 > max_size as i64 {
            return Err(format!(
                "image {}x{} exceeds GL_MAX_TEXTURE_SIZE ({max_size})",
                image.width, image.height
            ));
        }

        let (min_filter, mag_filter) = match filter {
            TextureFilter::Linear => (glow::LINEAR_MIPMAP_LINEAR, glow::LINEAR),
            TextureFilter::Nearest => (glow::NEAREST, glow::NEAREST),
        };

        let tex = gl.create_texture()?;
        gl.bind_texture(glow::TEXTURE_2D, Some(tex));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, min_filter as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, mag_filter as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA8 as i32,
            image.width as i32,
            image.height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            Some(&image.pixels),
        );
        if filter == TextureFilter::Linear {
            gl.generate_mipmap(glow::TEXTURE_2D);
        }
        gl.bind_texture(glow::TEXTURE_2D, None);
        Ok(tex)
    }
}

/// Quad objects created so far. A failed build releases exactly these.
#[derive(Debug, Clone, Copy, PartialEq)]
struct QuadBuffers<V = glow::VertexArray, B = glow::Buffer> {
    vao: Option<V>,
    vbo: Option<B>,
    ebo: Option<B>,
}

impl<V: Copy, B: Copy> QuadBuffers<V, B> {
    const EMPTY: Self = Self {
        vao: None,
        vbo: None,
        ebo: None,
    };

    fn complete(&self) -> Option<(V, B, B)> {
        Some((self.vao?, self.vbo?, self.ebo?))
    }
}

impl QuadBuffers {
    fn release(&self, gl: &glow::Context) {
        unsafe {
            if let Some(vao) = self.vao {
                gl.delete_vertex_array(vao);
            }
            for buffer in [self.vbo, self.ebo].into_iter().flatten() {
                gl.delete_buffer(buffer);
            }
        }
    }
}

fn fill_quad_buffers(
    gl: &glow::Context,
    program: glow::Program,
    aspect: f32,
    created: &mut QuadBuffers,
) -> Result<(), String> {
    let vertices = quad_vertices(aspect);
    unsafe {
        let vao = gl.create_vertex_array()?;
        created.vao = Some(vao);
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        created.vbo = Some(vbo);
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, as_bytes(&vertices), glow::STATIC_DRAW);

        // bound while the VAO is bound, so the VAO remembers it
        let ebo = gl.create_buffer()?;
        created.ebo = Some(ebo);
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            as_bytes(&QUAD_INDICES),
            glow::STATIC_DRAW,
        );

        let stride = (VERTEX_STRIDE * 4) as i32;
        let a_pos = gl
            .get_attrib_location(program, "a_pos")
            .ok_or("missing attribute a_pos")?;
        gl.enable_vertex_attrib_array(a_pos);
        gl.vertex_attrib_pointer_f32(a_pos, 3, glow::FLOAT, false, stride, 0);

        let a_uv = gl
            .get_attrib_location(program, "a_uv")
            .ok_or("missing attribute a_uv")?;
        gl.enable_vertex_attrib_array(a_uv);
        gl.vertex_attrib_pointer_f32(a_uv, 2, glow::FLOAT, false, stride, 3 * 4);
    }
    Ok(())
}

/// VAO + VBO + EBO for the image quad. On failure nothing is left allocated.
fn build_quad_buffers(
    gl: &glow::Context,
    program: glow::Program,
    aspect: f32,
) -> Result<(glow::VertexArray, glow::Buffer, glow::Buffer), String> {
    let mut created: QuadBuffers = QuadBuffers::EMPTY;
    let result = fill_quad_buffers(gl, program, aspect, &mut created);
    unsafe {
        gl.bind_vertex_array(None);
        gl.bind_buffer(glow::ARRAY_BUFFER, None);
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);
    }

    match result.map(|()| created.complete()) {
        Ok(Some(buffers)) => Ok(buffers),
        Ok(None) => {
            created.release(gl);
            Err("quad buffers incomplete".to_string())
        }
        Err(error) => {
            created.release(gl);
            Err(error)
        }
    }
}

impl GlQuad {
    /// Compile the program, build the quad buffers and upload the texture.
    pub fn new(
        gl: &glow::Context,
        image: &DecodedImage,
        filter: TextureFilter,
    ) -> Result<Self, String> {
        let program = link_program(gl)?;
        let texture = match upload_texture(gl, image, filter) {
            Ok(texture) => texture,
            Err(error) => {
                unsafe { gl.delete_program(program) };
                return Err(error);
            }
        };

        let (vao, vbo, ebo) = match build_quad_buffers(gl, program, image.aspect()) {
            Ok(buffers) => buffers,
            Err(error) => {
                unsafe {
                    gl.delete_texture(texture);
                    gl.delete_program(program);
                }
                return Err(error);
            }
        };

        unsafe {
            log::debug!(
                "GL quad ready: {}x{} texture, aspect {:.3}",
                image.width,
                image.height,
                image.aspect()
            );

            Ok(Self {
                program,
                vao,
                vbo,
                ebo,
                texture,
                loc_model: gl.get_uniform_location(program, "modelMatrix"),
                loc_proj: gl.get_uniform_location(program, "projMatrix"),
                loc_image: gl.get_uniform_location(program, "u_image"),
                pending: PendingUniforms::default(),
            })
        }
    }

    /// Queue the matrices that changed this frame.
    pub fn queue(&mut self, upload: FrameUpload) {
        self.pending.merge(upload);
    }

    fn paint(&mut self, gl: &glow::Context) {
        let upload = self.pending.take();
        unsafe {
            gl.disable(glow::SCISSOR_TEST);
            gl.enable(glow::BLEND);
            gl.blend_func_separate(
                glow::SRC_ALPHA,
                glow::ONE_MINUS_SRC_ALPHA,
                glow::ONE,
                glow::ONE_MINUS_SRC_ALPHA,
            );

            gl.use_program(Some(self.program));

            if let Some(model) = upload.model {
                gl.uniform_matrix_4_f32_slice(self.loc_model.as_ref(), false, &model.to_cols_array());
            }
            if let Some(proj) = upload.proj {
                gl.uniform_matrix_4_f32_slice(self.loc_proj.as_ref(), false, &proj.to_cols_array());
            }

            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
            gl.uniform_1_i32(self.loc_image.as_ref(), 0);

            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, QUAD_INDICES.len() as i32, glow::UNSIGNED_INT, 0);
            gl.bind_vertex_array(None);

            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.use_program(None);
        }
    }

    /// Release GL resources. Must be called with a current GL context.
    pub fn destroy(&mut self, gl: &glow::Context) {
        unsafe {
            gl.delete_texture(self.texture);
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
            gl.delete_program(self.program);
        }
        log::debug!("GL quad released");
    }
}

/// Build the [`egui::PaintCallback`] that draws the quad into `rect`.
pub fn make_quad_callback(quad: Arc<Mutex<GlQuad>>, rect: egui::Rect) -> egui::PaintCallback {
    let cb = egui_glow::CallbackFn::new(move |_info, painter| {
        let Ok(mut quad) = quad.lock() else {
            log::error!("GL quad state poisoned, skipping draw");
            return;
        };
        quad.paint(painter.gl());
    });

    egui::PaintCallback {
        rect,
        callback: Arc::new(cb),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix::Transform;

    #[test]
    fn landscape_quad_spans_full_width() {
        let v = quad_vertices(2.0);
        // top-right
        assert_eq!(&v[0..5], &[1.0, 0.5, 0.0, 1.0, 0.0]);
        // bottom-left
        assert_eq!(&v[10..15], &[-1.0, -0.5, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn portrait_quad_spans_full_height() {
        let v = quad_vertices(0.5);
        assert_eq!(&v[15..20], &[-0.5, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn indices_cover_two_triangles() {
        assert_eq!(QUAD_INDICES.len(), 6);
        assert!(QUAD_INDICES.iter().all(|&i| i < 4));
    }

    #[test]
    fn pending_keeps_latest_matrix_until_taken() {
        let mut pending = PendingUniforms::default();
        let zoomed = Transform::from_scale(2.0, 2.0, 1.0);

        pending.merge(FrameUpload {
            model: Some(Transform::IDENTITY),
            proj: Some(Transform::IDENTITY),
        });
        // a frame whose callback did not run yet
        pending.merge(FrameUpload {
            model: Some(zoomed),
            proj: None,
        });

        let upload = pending.take();
        assert_eq!(upload.model, Some(zoomed));
        assert_eq!(upload.proj, Some(Transform::IDENTITY));
        assert_eq!(pending.take(), FrameUpload::default());
    }

    #[test]
    fn partial_buffers_are_not_complete() {
        let mut created: QuadBuffers<u32, u32> = QuadBuffers::EMPTY;
        assert_eq!(created.complete(), None);

        // VAO and VBO exist, EBO creation failed
        created.vao = Some(1);
        created.vbo = Some(2);
        assert_eq!(created.complete(), None);
        assert_eq!([created.vbo, created.ebo].into_iter().flatten().count(), 1);

        created.ebo = Some(3);
        assert_eq!(created.complete(), Some((1, 2, 3)));
    }

    #[test]
    fn byte_view_matches_length() {
        assert_eq!(as_bytes(&QUAD_INDICES).len(), 24);
        assert_eq!(as_bytes(&quad_vertices(1.0)).len(), 80);
    }
}
