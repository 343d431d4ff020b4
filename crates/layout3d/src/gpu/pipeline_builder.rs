//! Reusable GPU compute pipeline builder.
//!
//! Collects buffer binding specifications in declaration order and turns
//! them into a shader module, bind group layout, pipeline layout and
//! compute pipeline:
//!
//! ```ignore
//! let (pipeline, layout) = PipelineBuilder::new(device)
//!     .shader_source(include_str!("shaders/reshuffle.wgsl"))
//!     .label("reshuffle")
//!     .entry_point("reshuffle")
//!     .uniform_buffer()
//!     .storage_buffer(true)   // read-only
//!     .storage_buffer(false)  // read-write
//!     .build();
//! ```

/// Specification for a single buffer binding.
#[derive(Clone, Debug)]
enum BufferBinding {
    Uniform,
    Storage { read_only: bool },
}

/// Builder for compute pipelines over uniform/storage buffer bindings.
pub struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    shader_source: Option<&'a str>,
    label: Option<&'a str>,
    entry_point: &'a str,
    bindings: Vec<BufferBinding>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            shader_source: None,
            label: None,
            entry_point: "main",
            bindings: Vec::new(),
        }
    }

    /// Set the WGSL shader source code.
    pub fn shader_source(mut self, source: &'a str) -> Self {
        self.shader_source = Some(source);
        self
    }

    /// Set the label used for every created wgpu object.
    pub fn label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Set the entry point function name (default: "main").
    pub fn entry_point(mut self, entry_point: &'a str) -> Self {
        self.entry_point = entry_point;
        self
    }

    /// Add a uniform buffer binding at the next binding index.
    pub fn uniform_buffer(mut self) -> Self {
        self.bindings.push(BufferBinding::Uniform);
        self
    }

    /// Add a storage buffer binding at the next binding index.
    pub fn storage_buffer(mut self, read_only: bool) -> Self {
        self.bindings.push(BufferBinding::Storage { read_only });
        self
    }

    /// Add multiple storage buffers at once; each flag is one binding.
    pub fn storage_buffers(mut self, read_only_flags: &[bool]) -> Self {
        for &read_only in read_only_flags {
            self.bindings.push(BufferBinding::Storage { read_only });
        }
        self
    }

    fn layout_entries(&self) -> Vec<wgpu::BindGroupLayoutEntry> {
        self.bindings
            .iter()
            .enumerate()
            .map(|(binding, spec)| wgpu::BindGroupLayoutEntry {
                binding: binding as u32,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: match spec {
                        BufferBinding::Uniform => wgpu::BufferBindingType::Uniform,
                        BufferBinding::Storage { read_only } => {
                            wgpu::BufferBindingType::Storage {
                                read_only: *read_only,
                            }
                        }
                    },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect()
    }

    /// Build one pipeline plus its bind group layout.
    ///
    /// # Panics
    /// Panics if `shader_source` was not set.
    pub fn build(self) -> (wgpu::ComputePipeline, wgpu::BindGroupLayout) {
        let (pipelines, layout) = self.build_entries(None);
        let mut pipelines = pipelines;
        (pipelines.remove(0), layout)
    }

    /// Build several pipelines from the same module and layout, one per
    /// entry point. Kernels with multiple passes over the same bindings
    /// (clear + scatter, seed + scan + finalize) share one bind group this
    /// way.
    pub fn build_multi(
        self,
        entry_points: &[&str],
    ) -> (Vec<wgpu::ComputePipeline>, wgpu::BindGroupLayout) {
        self.build_entries(Some(entry_points))
    }

    fn build_entries(
        self,
        entry_points: Option<&[&str]>,
    ) -> (Vec<wgpu::ComputePipeline>, wgpu::BindGroupLayout) {
        let shader_source = self
            .shader_source
            .expect("shader_source must be set before building");

        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: self.label.or(Some("Pipeline Shader")),
                source: wgpu::ShaderSource::Wgsl(shader_source.into()),
            });

        let entries = self.layout_entries();
        let bind_group_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: self.label,
                    entries: &entries,
                });

        let pipeline_layout =
            self.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: self.label,
                    bind_group_layouts: &[&bind_group_layout],
                    push_constant_ranges: &[],
                });

        let single = [self.entry_point];
        let names = entry_points.unwrap_or(&single);
        let pipelines = names
            .iter()
            .map(|&entry| {
                self.device
                    .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                        label: self.label,
                        layout: Some(&pipeline_layout),
                        module: &shader,
                        entry_point: Some(entry),
                        compilation_options: Default::default(),
                        cache: None,
                    })
            })
            .collect();

        (pipelines, bind_group_layout)
    }
}
