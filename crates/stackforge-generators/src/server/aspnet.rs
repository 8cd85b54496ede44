//! ASP.NET Core Web API (controllers + in-memory services).

use serde_json::json;
use stackforge_core::{
    application::ports::{Generator, GeneratorOutput},
    domain::{
        ArtifactKind, AuthScheme, Entity, Facet, Field, GenerationContext, Operation,
        OperationKind, ServerFramework, StackDescriptor, resolve_operations,
        transform::{ImportSet, TargetSyntax, csharp_type, target_type, to_camel_case, to_pascal_case},
    },
};
use tracing::instrument;

use super::{is_servable, mutates};
use crate::support::{CodeWriter, Sink, csharp_file, cs_quoted, id_type, payload_fields, pretty_json};

const ID: &str = "aspnetcore-server";

/// Framework symbols and the namespace that makes each one resolvable.
/// Implicit usings are disabled in the generated project, so every file
/// gets exactly the directives its body needs.
const USINGS: &[(&str, &[&str])] = &[
    ("System", &["Guid", "DateOnly", "DateTime"]),
    ("System.Collections.Concurrent", &["ConcurrentDictionary"]),
    ("System.Collections.Generic", &["IEnumerable", "IReadOnlyList"]),
    ("System.Linq", &["ToList"]),
    ("System.Text", &["Encoding"]),
    ("System.Threading", &["Interlocked"]),
    ("System.Threading.Tasks", &["Task"]),
    ("Microsoft.AspNetCore.Authentication.JwtBearer", &["JwtBearerDefaults"]),
    ("Microsoft.AspNetCore.Authorization", &["Authorize"]),
    ("Microsoft.AspNetCore.Builder", &["WebApplication"]),
    (
        "Microsoft.AspNetCore.Mvc",
        &[
            "ApiController", "ControllerBase", "Route", "HttpGet", "HttpPost", "HttpPut",
            "HttpPatch", "HttpDelete", "ActionResult", "IActionResult", "FromBody",
        ],
    ),
    ("Microsoft.Extensions.DependencyInjection", &["AddControllers", "AddSingleton"]),
    ("Microsoft.Extensions.Hosting", &["IsDevelopment"]),
    ("Microsoft.Extensions.Logging", &["ILogger"]),
    ("Microsoft.Identity.Web", &["AddMicrosoftIdentityWebApi"]),
    ("Microsoft.IdentityModel.Tokens", &["TokenValidationParameters", "SymmetricSecurityKey"]),
];

fn framework_usings() -> ImportSet {
    let mut imports = ImportSet::new();
    for (namespace, symbols) in USINGS {
        imports.named_all(namespace, symbols.iter().copied());
    }
    imports
}

/// Generates the `api/` service for ASP.NET Core.
pub struct AspNetCoreGenerator;

impl AspNetCoreGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AspNetCoreGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for AspNetCoreGenerator {
    fn id(&self) -> &'static str {
        ID
    }

    fn facet(&self) -> Facet {
        Facet::Server
    }

    fn supports(&self, descriptor: &StackDescriptor) -> bool {
        descriptor
            .server()
            .is_some_and(|s| s.framework == ServerFramework::AspNetCore)
    }

    fn priority(&self) -> i32 {
        100
    }

    fn is_blocking(&self) -> bool {
        true
    }

    #[instrument(skip_all, fields(generator = ID, entities = ctx.entities.len()))]
    fn generate(&self, ctx: &GenerationContext, descriptor: &StackDescriptor) -> GeneratorOutput {
        let mut sink = Sink::new(ID, Facet::Server);
        let entities = sink.valid_entities(ctx);
        let root = format!("{}.Api", ctx.project.pascal_name());
        let auth = ctx.architecture.auth;
        let port = descriptor.server().map_or(8080, |s| s.port);

        sink.emit(format!("api/{root}.csproj"), ArtifactKind::Manifest, csproj(&root, auth));
        sink.emit("api/appsettings.json", ArtifactKind::Config, appsettings(ctx));
        sink.emit("api/Program.cs", ArtifactKind::EntryPoint, program_cs(&root, &entities, auth, port));
        for entity in &entities {
            let api = EntityApi::new(entity, ctx, &root);
            sink.emit(
                format!("api/Models/{}Dto.cs", api.singular),
                ArtifactKind::Schema,
                api.dto(),
            );
            sink.emit(
                format!("api/Services/I{}Service.cs", api.singular),
                ArtifactKind::Service,
                api.service_interface(),
            );
            sink.emit(
                format!("api/Services/{}Service.cs", api.singular),
                ArtifactKind::Service,
                api.service_impl(),
            );
            sink.emit(
                format!("api/Controllers/{}Controller.cs", api.singular),
                ArtifactKind::Controller,
                api.controller(auth),
            );
        }
        sink.finish()
    }
}

fn csproj(root: &str, auth: AuthScheme) -> String {
    let mut packages = vec![("Swashbuckle.AspNetCore", "6.6.2")];
    match auth {
        AuthScheme::None => {}
        AuthScheme::Jwt => packages.push(("Microsoft.AspNetCore.Authentication.JwtBearer", "8.0.8")),
        AuthScheme::EntraId => {
            packages.push(("Microsoft.AspNetCore.Authentication.JwtBearer", "8.0.8"));
            packages.push(("Microsoft.Identity.Web", "3.1.0"));
        }
    }

    let mut w = CodeWriter::new();
    w.line("<Project Sdk=\"Microsoft.NET.Sdk.Web\">")
        .blank()
        .open("  <PropertyGroup>")
        .line("  <TargetFramework>net8.0</TargetFramework>")
        .line("  <Nullable>enable</Nullable>")
        .line("  <ImplicitUsings>disable</ImplicitUsings>")
        .line(format!("  <RootNamespace>{root}</RootNamespace>"))
        .close("  </PropertyGroup>")
        .blank()
        .open("  <ItemGroup>");
    for (name, version) in packages {
        w.line(format!("  <PackageReference Include=\"{name}\" Version=\"{version}\" />"));
    }
    w.close("  </ItemGroup>").blank().line("</Project>");
    w.finish()
}

fn appsettings(ctx: &GenerationContext) -> String {
    let mut settings = json!({
        "Logging": {
            "LogLevel": {
                "Default": "Information",
                "Microsoft.AspNetCore": "Warning"
            }
        },
        "AllowedHosts": "*"
    });
    match ctx.architecture.auth {
        AuthScheme::None => {}
        AuthScheme::Jwt => {
            let name = ctx.project.package_name();
            settings["Jwt"] = json!({
                "Issuer": name,
                "Audience": format!("{name}-clients"),
                "Key": ""
            });
        }
        AuthScheme::EntraId => {
            settings["AzureAd"] = json!({
                "Instance": "https://login.microsoftonline.com/",
                "TenantId": "",
                "ClientId": "",
                "Audience": ""
            });
        }
    }
    pretty_json(&settings)
}

const JWT_SETUP: &str = r#"builder.Services
    .AddAuthentication(JwtBearerDefaults.AuthenticationScheme)
    .AddJwtBearer(options =>
    {
        options.TokenValidationParameters = new TokenValidationParameters
        {
            ValidateIssuer = true,
            ValidIssuer = builder.Configuration["Jwt:Issuer"],
            ValidateAudience = true,
            ValidAudience = builder.Configuration["Jwt:Audience"],
            ValidateIssuerSigningKey = true,
            IssuerSigningKey = new SymmetricSecurityKey(
                Encoding.UTF8.GetBytes(builder.Configuration["Jwt:Key"] ?? string.Empty)),
        };
    });
builder.Services.AddAuthorization();"#;

fn program_cs(root: &str, entities: &[&Entity], auth: AuthScheme, port: u16) -> String {
    let mut imports = framework_usings();
    let mut w = CodeWriter::with_unit("    ");
    w.line("var builder = WebApplication.CreateBuilder(args);")
        .blank()
        .line("builder.Services.AddControllers();")
        .line("builder.Services.AddEndpointsApiExplorer();")
        .line("builder.Services.AddSwaggerGen();");

    for entity in entities {
        let singular = entity.singular();
        imports.named(format!("{root}.Services"), format!("I{singular}Service"));
        w.line(format!(
            "builder.Services.AddSingleton<I{singular}Service, {singular}Service>();"
        ));
        if !entity.dependencies.is_empty() {
            let deps: Vec<String> = entity
                .dependencies
                .iter()
                .map(|b| {
                    let needed = if b.is_required() { "required" } else { "optional" };
                    format!("{} ({needed})", b.ty)
                })
                .collect();
            w.line(format!(
                "// {singular}Controller also resolves: {}",
                deps.join(", ")
            ));
        }
    }

    match auth {
        AuthScheme::None => {}
        AuthScheme::Jwt => {
            for line in JWT_SETUP.lines() {
                w.line(line);
            }
        }
        AuthScheme::EntraId => {
            w.line("builder.Services")
                .line("    .AddAuthentication(JwtBearerDefaults.AuthenticationScheme)")
                .line("    .AddMicrosoftIdentityWebApi(builder.Configuration.GetSection(\"AzureAd\"));")
                .line("builder.Services.AddAuthorization();");
        }
    }

    w.blank()
        .line("var app = builder.Build();")
        .blank()
        .line("if (app.Environment.IsDevelopment())")
        .open("{")
        .line("app.UseSwagger();")
        .line("app.UseSwaggerUI();")
        .close("}")
        .blank();
    if auth.is_enabled() {
        w.line("app.UseAuthentication();").line("app.UseAuthorization();");
    }
    w.line("app.MapControllers();")
        .blank()
        .line(format!("app.Run({});", cs_quoted(&format!("http://0.0.0.0:{port}"))));

    csharp_file(&imports, &w.finish())
}

/// Per-entity names shared by the DTO, service and controller files.
struct EntityApi<'a> {
    entity: &'a Entity,
    root: &'a str,
    singular: String,
    id_cs: &'static str,
    fields: Vec<Field>,
    ops: Vec<Operation>,
}

impl<'a> EntityApi<'a> {
    fn new(entity: &'a Entity, ctx: &GenerationContext, root: &'a str) -> Self {
        let id_cs = match target_type(&id_type(entity), TargetSyntax::CSharp) {
            "int" => "int",
            "string" => "string",
            _ => "Guid",
        };
        Self {
            entity,
            root,
            singular: entity.singular(),
            id_cs,
            fields: payload_fields(entity, ctx),
            ops: resolve_operations(entity),
        }
    }

    fn dto_name(&self) -> String {
        format!("{}Dto", self.singular)
    }

    fn request_name(&self) -> String {
        format!("{}Request", self.singular)
    }

    fn has(&self, kind: OperationKind) -> bool {
        self.ops.iter().any(|o| o.kind == kind && is_servable(o))
    }

    fn imports(&self) -> ImportSet {
        let mut imports = framework_usings();
        imports
            .named(format!("{}.Models", self.root), self.dto_name())
            .named(format!("{}.Models", self.root), self.request_name())
            .named(format!("{}.Services", self.root), format!("I{}Service", self.singular));
        imports
    }

    fn record(&self, w: &mut CodeWriter, name: &str, with_id: bool) {
        let mut members = Vec::new();
        if with_id {
            members.push(format!("{} Id", self.id_cs));
        }
        for field in &self.fields {
            members.push(format!(
                "{} {}",
                csharp_type(&field.ty, field.is_required()),
                field.pascal_name()
            ));
        }
        if members.is_empty() {
            w.line(format!("public record {name}();"));
            return;
        }
        w.open(format!("public record {name}("));
        let last = members.len() - 1;
        for (i, member) in members.iter().enumerate() {
            let end = if i == last { ");" } else { "," };
            w.line(format!("{member}{end}"));
        }
        w.close("");
    }

    fn dto(&self) -> String {
        let mut w = CodeWriter::with_unit("    ");
        w.line(format!("namespace {}.Models;", self.root)).blank();
        self.record(&mut w, &self.dto_name(), true);
        self.record(&mut w, &self.request_name(), false);
        let body = w.finish();
        csharp_file(&framework_usings(), body.trim_end()).trim_end().to_string() + "\n"
    }

    fn service_interface(&self) -> String {
        let dto = self.dto_name();
        let request = self.request_name();
        let id = self.id_cs;
        let mut w = CodeWriter::with_unit("    ");
        w.line(format!("namespace {}.Services;", self.root))
            .blank()
            .line(format!("public interface I{}Service", self.singular))
            .open("{");
        if self.has(OperationKind::List) {
            w.line(format!("Task<IReadOnlyList<{dto}>> ListAsync();"));
        }
        if self.has(OperationKind::Get) {
            w.line(format!("Task<{dto}?> GetAsync({id} id);"));
        }
        if self.has(OperationKind::Create) {
            w.line(format!("Task<{dto}> CreateAsync({request} request);"));
        }
        if self.has(OperationKind::Update) {
            w.line(format!("Task<{dto}?> UpdateAsync({id} id, {request} request);"));
        }
        if self.has(OperationKind::Delete) {
            w.line(format!("Task<bool> DeleteAsync({id} id);"));
        }
        w.close("}");
        csharp_file(&self.imports(), &w.finish())
    }

    /// `new InvoiceDto(id, request.Amount, ...)`
    fn construct(&self, id_expr: &str) -> String {
        let mut args = vec![id_expr.to_string()];
        args.extend(
            self.fields
                .iter()
                .map(|f| format!("request.{}", f.pascal_name())),
        );
        format!("new {}({})", self.dto_name(), args.join(", "))
    }

    fn service_impl(&self) -> String {
        let dto = self.dto_name();
        let request = self.request_name();
        let id = self.id_cs;
        let mut w = CodeWriter::with_unit("    ");
        w.line(format!("namespace {}.Services;", self.root))
            .blank()
            .line(format!(
                "public class {0}Service : I{0}Service",
                self.singular
            ))
            .open("{")
            .line(format!(
                "private readonly ConcurrentDictionary<{id}, {dto}> _items = new();"
            ));
        let new_id = match id {
            "int" => {
                w.line("private int _nextId;");
                "Interlocked.Increment(ref _nextId)"
            }
            "string" => "Guid.NewGuid().ToString()",
            _ => "Guid.NewGuid()",
        };

        if self.has(OperationKind::List) {
            w.blank()
                .line(format!("public Task<IReadOnlyList<{dto}>> ListAsync()"))
                .open("{")
                .line(format!("IReadOnlyList<{dto}> items = _items.Values.ToList();"))
                .line("return Task.FromResult(items);")
                .close("}");
        }
        if self.has(OperationKind::Get) {
            w.blank()
                .line(format!("public Task<{dto}?> GetAsync({id} id)"))
                .open("{")
                .line(format!(
                    "return Task.FromResult<{dto}?>(_items.TryGetValue(id, out var item) ? item : null);"
                ))
                .close("}");
        }
        if self.has(OperationKind::Create) {
            w.blank()
                .line(format!("public Task<{dto}> CreateAsync({request} request)"))
                .open("{")
                .line(format!("var item = {};", self.construct(new_id)))
                .line("_items[item.Id] = item;")
                .line("return Task.FromResult(item);")
                .close("}");
        }
        if self.has(OperationKind::Update) {
            w.blank()
                .line(format!(
                    "public Task<{dto}?> UpdateAsync({id} id, {request} request)"
                ))
                .open("{")
                .line("if (!_items.ContainsKey(id))")
                .open("{")
                .line(format!("return Task.FromResult<{dto}?>(null);"))
                .close("}")
                .line(format!("var item = {};", self.construct("id")))
                .line("_items[id] = item;")
                .line(format!("return Task.FromResult<{dto}?>(item);"))
                .close("}");
        }
        if self.has(OperationKind::Delete) {
            w.blank()
                .line(format!("public Task<bool> DeleteAsync({id} id)"))
                .open("{")
                .line("return Task.FromResult(_items.TryRemove(id, out _));")
                .close("}");
        }
        w.close("}");
        csharp_file(&self.imports(), &w.finish())
    }

    fn controller(&self, auth: AuthScheme) -> String {
        let name = format!("{}Controller", self.singular);
        let service = format!("I{}Service", self.singular);

        let mut required = vec![(service.clone(), "service".to_string())];
        let mut optional = Vec::new();
        for binding in &self.entity.dependencies {
            let param = to_camel_case(&binding.name);
            if binding.is_required() {
                required.push((binding.ty.clone(), param));
            } else {
                optional.push((format!("{}?", binding.ty), param));
            }
        }

        let mut w = CodeWriter::with_unit("    ");
        w.line(format!("namespace {}.Controllers;", self.root))
            .blank()
            .line("[ApiController]")
            .line(format!(
                "[Route({})]",
                cs_quoted(&format!("api/{}", self.entity.route_segment()))
            ))
            .line(format!("public class {name} : ControllerBase"))
            .open("{");
        for (ty, param) in required.iter().chain(&optional) {
            w.line(format!("private readonly {ty} _{param};"));
        }

        let params: Vec<String> = required
            .iter()
            .map(|(ty, p)| format!("{ty} {p}"))
            .chain(optional.iter().map(|(ty, p)| format!("{ty} {p} = null")))
            .collect();
        w.blank()
            .line(format!("public {name}({})", params.join(", ")))
            .open("{");
        for (_, param) in required.iter().chain(&optional) {
            w.line(format!("_{param} = {param};"));
        }
        w.close("}");

        for op in &self.ops {
            w.blank();
            self.action(&mut w, op, auth);
        }
        w.close("}");

        csharp_file(&self.imports(), &w.finish())
    }

    fn action(&self, w: &mut CodeWriter, op: &Operation, auth: AuthScheme) {
        let dto = self.dto_name();
        let request = self.request_name();
        let method = to_pascal_case(&op.name);
        let template = op.route_template();
        let attribute = if template.is_empty() {
            format!("[{}]", op.method.aspnet_attribute())
        } else {
            format!("[{}({})]", op.method.aspnet_attribute(), cs_quoted(&template))
        };

        if let Some(description) = &op.description {
            w.line(format!("/// <summary>{}</summary>", description.replace('\n', " ")));
        }
        w.line(attribute);
        if auth.is_enabled() && mutates(op) {
            w.line("[Authorize]");
        }

        let route_params: Vec<String> = op
            .path_params()
            .into_iter()
            .map(|p| {
                let ty = if p == "id" { self.id_cs } else { "string" };
                format!("{ty} {}", to_camel_case(p))
            })
            .collect();

        if !is_servable(op) {
            w.line(format!(
                "public IActionResult {method}({})",
                route_params.join(", ")
            ))
            .open("{")
            .line("return StatusCode(501);")
            .close("}");
            return;
        }

        match op.kind {
            OperationKind::List => {
                w.line(format!(
                    "public async Task<ActionResult<IEnumerable<{dto}>>> {method}()"
                ))
                .open("{")
                .line("return Ok(await _service.ListAsync());")
                .close("}");
            }
            OperationKind::Get => {
                w.line(format!(
                    "public async Task<ActionResult<{dto}>> {method}({} id)",
                    self.id_cs
                ))
                .open("{")
                .line("var item = await _service.GetAsync(id);")
                .line("if (item is null)")
                .open("{")
                .line("return NotFound();")
                .close("}")
                .line("return Ok(item);")
                .close("}");
            }
            OperationKind::Create => {
                w.line(format!(
                    "public async Task<ActionResult<{dto}>> {method}([FromBody] {request} request)"
                ))
                .open("{")
                .line("var created = await _service.CreateAsync(request);")
                .line("return StatusCode(201, created);")
                .close("}");
            }
            OperationKind::Update => {
                w.line(format!(
                    "public async Task<ActionResult<{dto}>> {method}({} id, [FromBody] {request} request)",
                    self.id_cs
                ))
                .open("{")
                .line("var updated = await _service.UpdateAsync(id, request);")
                .line("if (updated is null)")
                .open("{")
                .line("return NotFound();")
                .close("}")
                .line("return Ok(updated);")
                .close("}");
            }
            OperationKind::Delete => {
                w.line(format!(
                    "public async Task<IActionResult> {method}({} id)",
                    self.id_cs
                ))
                .open("{")
                .line("if (!await _service.DeleteAsync(id))")
                .open("{")
                .line("return NotFound();")
                .close("}")
                .line("return NoContent();")
                .close("}");
            }
            OperationKind::Custom => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackforge_core::domain::{
        ArchitectureChoices, Binding, OperationDecl, ProjectInfo, Relation,
    };

    fn stack() -> StackDescriptor {
        StackDescriptor::builder()
            .server(ServerFramework::AspNetCore)
            .build()
            .unwrap()
    }

    fn context() -> GenerationContext {
        GenerationContext::new(ProjectInfo::new("invoice-desk"))
            .with_entity(Entity::new("Customer").with_field(Field::new("name", "string")))
            .with_entity(
                Entity::new("Invoice")
                    .with_field(Field::new("amount", "decimal"))
                    .with_field(Field::new("dueDate", "date"))
                    .with_field(Field::new("notes", "text").optional())
                    .with_relation(Relation::many_to_one("Customer"))
                    .with_operation(OperationDecl::new("archive").with_path("/:id/archive"))
                    .with_dependency(Binding::new("logger", "ILogger<InvoiceController>")),
            )
    }

    fn content<'a>(out: &'a GeneratorOutput, path: &str) -> &'a str {
        out.artifacts
            .iter()
            .find(|a| a.path() == path)
            .map(|a| a.content())
            .unwrap_or_else(|| panic!("missing {path}"))
    }

    #[test]
    fn emits_project_entry_point_and_per_entity_files() {
        let out = AspNetCoreGenerator::new().generate(&context(), &stack());
        assert!(out.is_complete(), "{:?}", out.errors);

        for path in [
            "api/InvoiceDesk.Api.csproj",
            "api/Program.cs",
            "api/Controllers/InvoiceController.cs",
            "api/Services/IInvoiceService.cs",
            "api/Services/InvoiceService.cs",
            "api/Models/InvoiceDto.cs",
            "api/Controllers/CustomerController.cs",
        ] {
            assert!(out.artifacts.iter().any(|a| a.path() == path), "{path}");
        }

        let program = content(&out, "api/Program.cs");
        assert!(program.contains("builder.Services.AddSingleton<IInvoiceService, InvoiceService>();"));
        assert!(program.contains("using InvoiceDesk.Api.Services;"));
        assert!(program.contains("app.Run(\"http://0.0.0.0:8080\");"));
        assert!(!program.contains("UseAuthentication"));
    }

    #[test]
    fn dto_uses_nullable_types_for_optional_fields() {
        let out = AspNetCoreGenerator::new().generate(&context(), &stack());
        let dto = content(&out, "api/Models/InvoiceDto.cs");

        assert!(dto.starts_with("using System;\n\nnamespace InvoiceDesk.Api.Models;"));
        assert!(dto.contains("    Guid Id,\n"));
        assert!(dto.contains("    decimal Amount,\n"));
        assert!(dto.contains("    DateOnly DueDate,\n"));
        assert!(dto.contains("    string? Notes,\n"));
        assert!(dto.contains("    Guid CustomerId);\n"));
    }

    #[test]
    fn controller_has_one_action_per_operation_and_only_needed_usings() {
        let out = AspNetCoreGenerator::new().generate(&context(), &stack());
        let controller = content(&out, "api/Controllers/InvoiceController.cs");

        assert!(controller.contains("[Route(\"api/invoices\")]"));
        assert!(controller.contains("public async Task<ActionResult<IEnumerable<InvoiceDto>>> ListInvoices()"));
        assert!(controller.contains("[HttpGet(\"{id}\")]"));
        assert!(controller.contains("public async Task<IActionResult> DeleteInvoice(Guid id)"));
        assert!(controller.contains("[HttpPost(\"{id}/archive\")]"));
        assert!(controller.contains("public IActionResult Archive(Guid id)"));
        assert!(controller.contains(
            "public InvoiceController(IInvoiceService service, ILogger<InvoiceController>? logger = null)"
        ));
        assert!(controller.contains("using Microsoft.Extensions.Logging;"));
        assert!(!controller.contains("using System.Linq;"));
        assert!(!controller.contains("[Authorize]"));

        let service = content(&out, "api/Services/InvoiceService.cs");
        assert!(service.contains("using System.Linq;"));
        assert!(service.contains(
            "var item = new InvoiceDto(Guid.NewGuid(), request.Amount, request.DueDate, request.Notes, request.CustomerId);"
        ));
    }

    #[test]
    fn auth_marks_mutating_actions_and_configures_the_pipeline() {
        let ctx = context().with_architecture(ArchitectureChoices {
            auth: AuthScheme::EntraId,
            ..Default::default()
        });
        let out = AspNetCoreGenerator::new().generate(&ctx, &stack());

        let controller = content(&out, "api/Controllers/InvoiceController.cs");
        assert_eq!(controller.matches("[Authorize]").count(), 4);
        let program = content(&out, "api/Program.cs");
        assert!(program.contains("AddMicrosoftIdentityWebApi"));
        assert!(program.contains("using Microsoft.Identity.Web;"));
        assert!(content(&out, "api/InvoiceDesk.Api.csproj").contains("Microsoft.Identity.Web"));
    }

    #[test]
    fn integer_ids_use_a_counter() {
        let ctx = GenerationContext::new(ProjectInfo::new("Shop"))
            .with_entity(Entity::new("Order").with_field(Field::new("id", "int")));
        let out = AspNetCoreGenerator::new().generate(&ctx, &stack());
        let service = content(&out, "api/Services/OrderService.cs");
        assert!(service.contains("ConcurrentDictionary<int, OrderDto>"));
        assert!(service.contains("Interlocked.Increment(ref _nextId)"));
    }
}
